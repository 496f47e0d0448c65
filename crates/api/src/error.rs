//! API error types with HTTP response mapping.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use serde_json::json;

/// API-level error type that maps to HTTP responses.
///
/// Bodies are `{"detail": "..."}`, except validation failures which are a
/// map from field name to messages.
#[derive(Debug)]
pub enum ApiError {
    /// Domain logic error.
    Domain(DomainError),
    /// The `Authorization` header could not be parsed.
    Unauthorized(String),
    /// A path segment did not name a resource.
    NotFound(String),
    /// The caller exhausted a throttle scope.
    Throttled { wait: Duration },
}

const INTERNAL_DETAIL: &str = "A server error occurred.";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Unauthorized(msg) => unauthorized(&msg),
            ApiError::NotFound(msg) => detail(StatusCode::NOT_FOUND, &msg),
            ApiError::Throttled { wait } => throttled(wait),
        }
    }
}

fn domain_error_to_response(err: DomainError) -> Response {
    match &err {
        DomainError::Unauthenticated
        | DomainError::InvalidToken
        | DomainError::InvalidCredentials => unauthorized(&err.to_string()),
        DomainError::Forbidden(_) => detail(StatusCode::FORBIDDEN, &err.to_string()),
        DomainError::EditLocked | DomainError::MalformedBody(_) => {
            detail(StatusCode::BAD_REQUEST, &err.to_string())
        }
        DomainError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, Json(errors.clone())).into_response()
        }
        DomainError::NotFound { .. } | DomainError::InvalidPage => {
            detail(StatusCode::NOT_FOUND, &err.to_string())
        }
        DomainError::Store(_)
        | DomainError::DataCorruption { .. }
        | DomainError::PasswordHash(_) => {
            tracing::error!(error = %err, "internal server error");
            detail(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unauthorized(message: &str) -> Response {
    let mut response = detail(StatusCode::UNAUTHORIZED, message);
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"api\""),
    );
    response
}

fn throttled(wait: Duration) -> Response {
    let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    let seconds = seconds.max(1);
    let unit = if seconds == 1 { "second" } else { "seconds" };

    let mut response = detail(
        StatusCode::TOO_MANY_REQUESTS,
        &format!("Request was throttled. Expected available in {seconds} {unit}."),
    );
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    response
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
