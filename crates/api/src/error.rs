//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use serde::Serialize;

/// Message returned for any 5xx; details stay in the logs.
const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// No caller identity on a route that needs one.
    Unauthorized,
    /// Resource or route not found.
    NotFound(String),
    /// Domain logic error.
    Domain(DomainError),
}

/// Error body: every failure carries a `message`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing authenticated user".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match err.kind() {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => {
            tracing::error!(error = %err, "order store failure");
            return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string());
        }
    };

    let message = match err {
        DomainError::Order(order_err) => order_err.to_string(),
        DomainError::Store(store_err) => store_err.to_string(),
    };
    (status, message)
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
