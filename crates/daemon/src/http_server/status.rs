use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

/// A bare status response whose body is the numeric code, e.g. `404`.
///
/// 204 responses carry no body.
pub fn status_response(status: StatusCode) -> Response {
    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }

    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        status.as_u16().to_string(),
    )
        .into_response()
}

/// 303 pointing at `location`.
pub fn see_other(location: &Url) -> Response {
    (
        [(header::LOCATION, location.to_string())],
        status_response(StatusCode::SEE_OTHER),
    )
        .into_response()
}
