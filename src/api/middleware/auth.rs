use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::TokenType;
use crate::domain::user::User;

/// Bearer-token authentication extractor for protected routes
///
/// Resolves the access token's subject to an active user.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(user): JwtAuth,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello {}", user.username))
/// }
/// ```
pub struct JwtAuth(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for JwtAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided."))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>")
            })?;

        let claims = state.tokens.verify(token, TokenType::Access).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            ApiError::unauthorized("Given token not valid for any token type")
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        Ok(JwtAuth(user))
    }
}
