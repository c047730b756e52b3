use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use common::prelude::DepositError;

use crate::http_server::multipart::{read_submission, SubmissionError};
use crate::http_server::status::{see_other, status_response};
use crate::http_server::Config;
use crate::ServiceState;

/// Accept one submission of `form_name`.
///
/// The form is looked up before the body is touched, so unknown forms are a
/// 404 whatever was sent.
pub async fn handler(
    State(state): State<ServiceState>,
    Extension(config): Extension<Config>,
    form_name: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, SubmitError> {
    // A segment that does not decode to UTF-8 cannot name any form
    let Ok(Path(form_name)) = form_name else {
        tracing::debug!("undecodable form name");
        return Ok(status_response(StatusCode::NOT_FOUND));
    };
    let Some(spec) = state.catalog().get(&form_name) else {
        tracing::debug!(form = %form_name, "no such form");
        return Ok(status_response(StatusCode::NOT_FOUND));
    };

    let multipart = multipart.map_err(SubmitError::Rejected)?;
    let submission = read_submission(multipart, spec, config.max_memory).await?;
    let message = state.translator().translate(spec, &submission);
    state.depositor().deposit(message).await?;

    // Spooled uploads are removed here, before the response is written
    drop(submission);

    tracing::info!(form = %spec.name, "finished processing form");
    Ok(match &config.redirect {
        Some(redirect) => see_other(redirect),
        None => status_response(StatusCode::NO_CONTENT),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("not a multipart request: {0}")]
    Rejected(MultipartRejection),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("failed to deposit message: {0}")]
    Deposit(#[from] DepositError),
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "failed to process form");
        status_response(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
