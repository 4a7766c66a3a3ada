//! Authentication middleware
//!
//! Bearer token verification and caller extraction.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::error::ApiError;

/// Message for requests that carry no bearer token
pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";

/// Caller resolved from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Extractor for authenticated users
///
/// Rejects with 401 when the Authorization header is missing, is not a
/// Bearer token, or carries a token that does not verify.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        auth_service.authenticate(bearer.token()).await
    }
}
