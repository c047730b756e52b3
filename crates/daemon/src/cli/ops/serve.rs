use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use url::Url;

use formsink_daemon::{spawn_service, ServiceConfig, ServiceError, Settings};

#[derive(Args, Debug, Clone, Default)]
pub struct Serve {
    /// Address to listen on [default: 127.0.0.1:1234]
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Maildir messages are delivered into [default: ./Maildir/]
    #[arg(long)]
    pub maildir: Option<PathBuf>,

    /// Where browsers are sent after a successful submission
    #[arg(long)]
    pub redirect: Option<Url>,

    /// Domain to send mail as (defaults to the system host name)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Bytes of uploads kept in memory per request before spooling to disk
    #[arg(long)]
    pub max_memory: Option<usize>,

    /// Largest accepted request body, in bytes
    #[arg(long)]
    pub max_body: Option<usize>,

    /// Log level [default: info]
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// HTML documents whose forms are accepted
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("invalid log level {0:?} in settings")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Serve {
    /// Merge the flags over `settings`; a flag always wins over the file.
    pub fn config(&self, settings: &Settings) -> Result<ServiceConfig, ServeError> {
        let defaults = ServiceConfig::default();

        let log_level = match (self.log_level, &settings.log_level) {
            (Some(level), _) => level,
            (None, Some(level)) => level
                .parse()
                .map_err(|_| ServeError::InvalidLogLevel(level.clone()))?,
            (None, None) => defaults.log_level,
        };
        let documents = if self.documents.is_empty() {
            settings.documents.clone()
        } else {
            self.documents.clone()
        };

        Ok(ServiceConfig {
            listen_addr: self
                .listen
                .or(settings.listen)
                .unwrap_or(defaults.listen_addr),
            redirect: self.redirect.clone().or_else(|| settings.redirect.clone()),
            max_memory: self
                .max_memory
                .or(settings.max_memory)
                .unwrap_or(defaults.max_memory),
            max_body: self
                .max_body
                .or(settings.max_body)
                .unwrap_or(defaults.max_body),
            documents,
            maildir: self
                .maildir
                .clone()
                .or_else(|| settings.maildir.clone())
                .unwrap_or(defaults.maildir),
            hostname: self.hostname.clone().or_else(|| settings.hostname.clone()),
            log_level,
            log_dir: self.log_dir.clone().or_else(|| settings.log_dir.clone()),
        })
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.config(&ctx.settings)?;
        spawn_service(&config).await?;
        Ok("form sink stopped".to_string())
    }
}
