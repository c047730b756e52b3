pub mod utils;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const LOG_FILE_NAME: &str = "formsink.log";

use crate::http_server::{self, HttpServerError};
use crate::{ServiceConfig, ServiceState, StateSetupError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to set up service state: {0}")]
    State(#[from] StateSetupError),
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
    #[error(transparent)]
    Server(#[from] HttpServerError),
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
    #[error("failed to shut down within {} seconds", .0.as_secs())]
    ShutdownTimeout(Duration),
}

/// Handle for gracefully shutting down the sink.
pub struct ShutdownHandle {
    graceful_waiter: JoinHandle<()>,
    server: JoinHandle<Result<(), HttpServerError>>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Block until the server stops, either after a shutdown signal or
    /// because it failed (e.g. the listen address is taken).
    pub async fn wait(self) -> Result<(), ServiceError> {
        let Self {
            mut graceful_waiter,
            mut server,
            ..
        } = self;

        tokio::select! {
            _ = &mut graceful_waiter => {}
            result = &mut server => {
                graceful_waiter.abort();
                return Ok(result??);
            }
        }

        match timeout(FINAL_SHUTDOWN_TIMEOUT, server).await {
            Ok(result) => Ok(result??),
            Err(_) => Err(ServiceError::ShutdownTimeout(FINAL_SHUTDOWN_TIMEOUT)),
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Initialize logging, panic handler, and build info reporting.
/// Returns guards that must be kept alive for the duration of the program.
fn init_logging(
    service_config: &ServiceConfig,
) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let mut guards = Vec::new();

    // Stdout layer
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(service_config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    // File layer (if log_dir is set)
    if let Some(log_dir) = &service_config.log_dir {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(service_config.log_level.into())
            .from_env_lossy();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(file_env_filter);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_layer).init();
    }

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Build the service state and spawn the HTTP server, returning the state
/// handle alongside the shutdown handle.
///
/// Must be called from within a tokio runtime. Dropping the returned
/// `ShutdownHandle` does not stop the service.
pub fn start_service(
    service_config: &ServiceConfig,
) -> Result<(ServiceState, ShutdownHandle), ServiceError> {
    let state = ServiceState::from_config(service_config)?;
    let (graceful_waiter, shutdown_tx, shutdown_rx) =
        utils::graceful_shutdown_blocker().map_err(ServiceError::Signals)?;

    let server_config = http_server::Config::new(service_config);
    let server_state = state.clone();
    let server = tokio::spawn(async move {
        let result = http_server::run(server_config, server_state, shutdown_rx).await;
        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    });

    tracing::info!(
        forms = state.catalog().len(),
        maildir = ?service_config.maildir,
        "running form sink"
    );

    let handle = ShutdownHandle {
        graceful_waiter,
        server,
        shutdown_tx,
    };

    Ok((state, handle))
}

/// Run the sink until a shutdown signal is received. Use for CLI binary usage.
pub async fn spawn_service(service_config: &ServiceConfig) -> Result<(), ServiceError> {
    let _guards = init_logging(service_config);

    let result = match start_service(service_config) {
        Ok((_, handle)) => handle.wait().await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        tracing::error!("form sink stopped: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::net::{Ipv4Addr, SocketAddr};

    use tempfile::TempDir;

    use super::*;

    fn config(dir: &TempDir) -> ServiceConfig {
        let document = dir.path().join("contact.html");
        fs::write(
            &document,
            r#"<form action="/contact"><input name="email"></form>"#,
        )
        .unwrap();

        ServiceConfig {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            documents: vec![document],
            maildir: dir.path().join("Maildir"),
            hostname: Some("formsink.test".to_string()),
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let dir = TempDir::new().unwrap();
        let (state, handle) = start_service(&config(&dir)).unwrap();
        assert!(state.catalog().get("contact").is_some());

        handle.shutdown();
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_fails_on_bad_documents() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig {
            documents: vec![dir.path().join("missing.html")],
            ..config(&dir)
        };

        assert!(matches!(
            start_service(&config),
            Err(ServiceError::State(StateSetupError::Document { .. }))
        ));
    }
}
