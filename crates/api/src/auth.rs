//! Caller identity supplied by the upstream gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated subject. Trusted verbatim.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// The authenticated caller.
///
/// Rejects with 401 when the header is missing, blank or not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHENTICATED_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self(UserId::from(s)))
            .ok_or(ApiError::Unauthorized)
    }
}
