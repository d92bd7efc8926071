//! Actor identity extraction
//!
//! Authentication itself is external: an upstream gateway authenticates the
//! user and installs the `X-User-Id` header. This service trusts that header
//! as the actor identity and rejects requests without one.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::models::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated actor, extracted from the gateway header
#[derive(Debug, Clone)]
pub struct Identity(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Identity(value.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}
