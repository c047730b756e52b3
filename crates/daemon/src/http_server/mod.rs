use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::{Extension, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

mod config;
mod handlers;
mod multipart;
mod status;

pub use config::Config;
pub use handlers::submit::SubmitError;
pub use multipart::{read_submission, SubmissionError};

use crate::ServiceState;

/// Build the sink router: `POST /:form_name` plus method and path fallbacks.
///
/// Kept separate from [`run`] so the routes can be driven without a socket.
pub fn router(config: Config, state: ServiceState) -> Router {
    let max_body = config.max_body;

    Router::new()
        .route(
            "/:form_name",
            post(handlers::submit::handler).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::fallback)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(Extension(config))
        .with_state(state)
}

/// Run the sink HTTP server until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(config, state).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "form sink listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
