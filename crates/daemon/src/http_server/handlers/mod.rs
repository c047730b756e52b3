use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use super::status::status_response;

pub mod submit;

/// Anything that is not a `POST /:form_name`.
///
/// Wrong methods are rejected before paths, so a `GET` anywhere is a 405.
pub async fn fallback(method: Method) -> Response {
    if method == Method::POST {
        status_response(StatusCode::NOT_FOUND)
    } else {
        method_not_allowed().await
    }
}

pub async fn method_not_allowed() -> Response {
    (
        [(header::ALLOW, "POST")],
        status_response(StatusCode::METHOD_NOT_ALLOWED),
    )
        .into_response()
}
