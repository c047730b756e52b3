use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use super::{DepositError, Depositor};
use crate::message::Message;

const TMP_DIR_NAME: &str = "tmp";
const NEW_DIR_NAME: &str = "new";
const CUR_DIR_NAME: &str = "cur";

/// Delivers messages into a maildir.
///
/// Each message is written to `tmp/`, synced, then linked into `new/` under a
/// name that is unique across processes and concurrent deliveries.
#[derive(Debug)]
pub struct MaildirDepositor {
    root: PathBuf,
    host: String,
    deliveries: AtomicU64,
}

impl MaildirDepositor {
    /// Open the maildir at `root`, creating `tmp/`, `new/` and `cur/` if needed.
    pub fn create(root: impl Into<PathBuf>, host: &str) -> Result<Self, DepositError> {
        let root = root.into();
        for dir in [TMP_DIR_NAME, NEW_DIR_NAME, CUR_DIR_NAME] {
            fs::create_dir_all(root.join(dir))?;
        }

        tracing::info!(maildir = ?root, "maildir ready");
        Ok(Self {
            root,
            // '/' and ':' are reserved in maildir file names
            host: host.replace('/', "\\057").replace(':', "\\072"),
            deliveries: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding delivered, unread messages.
    pub fn new_dir(&self) -> PathBuf {
        self.root.join(NEW_DIR_NAME)
    }

    fn unique_name(&self) -> String {
        let now = Utc::now();
        let delivery = self.deliveries.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}.M{}P{}Q{}R{}.{}",
            now.timestamp(),
            now.timestamp_subsec_micros(),
            std::process::id(),
            delivery,
            Uuid::new_v4().simple(),
            self.host
        )
    }
}

#[async_trait]
impl Depositor for MaildirDepositor {
    async fn deposit(&self, message: Message) -> Result<(), DepositError> {
        let bytes = message.to_bytes()?;
        let tmp = self.root.join(TMP_DIR_NAME);
        let destination = self.new_dir().join(self.unique_name());

        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, DepositError> {
            let mut file = NamedTempFile::new_in(&tmp)?;
            file.write_all(&bytes)?;
            file.as_file().sync_all()?;
            file.persist_noclobber(&destination).map_err(|e| e.error)?;
            Ok(destination)
        })
        .await??;

        tracing::debug!(path = ?path, subject = %message.subject, "deposited message");
        Ok(())
    }
}
