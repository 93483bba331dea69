//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod orders;

use crate::error::ApiError;

/// Fallback for any method/path pair without a handler.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}
