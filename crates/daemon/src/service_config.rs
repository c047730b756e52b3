use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use url::Url;

/// Default in-memory budget for uploads, per request.
pub const DEFAULT_MAX_MEMORY: usize = 32 << 20;

/// Default limit on the size of a request body.
pub const DEFAULT_MAX_BODY: usize = 32 << 20;

pub const DEFAULT_MAILDIR: &str = "./Maildir/";

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the sink to listen on
    pub listen_addr: SocketAddr,
    /// where to send browsers after a successful submission,
    ///  if not set then submissions are answered with 204
    pub redirect: Option<Url>,
    /// in-memory budget for uploads per request, larger
    ///  uploads are spooled to temporary files
    pub max_memory: usize,
    /// maximum accepted request body size
    pub max_body: usize,

    // forms + delivery
    /// HTML documents whose forms the sink accepts
    pub documents: Vec<PathBuf>,
    /// path to the maildir messages are delivered into
    pub maildir: PathBuf,
    /// domain messages are addressed from and to,
    ///  if not set then the system host name is used
    pub hostname: Option<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1234),
            redirect: None,
            max_memory: DEFAULT_MAX_MEMORY,
            max_body: DEFAULT_MAX_BODY,
            documents: Vec::new(),
            maildir: PathBuf::from(DEFAULT_MAILDIR),
            hostname: None,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
