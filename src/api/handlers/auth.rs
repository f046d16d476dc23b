use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::errors::ApiError;
use crate::api::extract::Payload;
use crate::api::middleware::JwtAuth;
use crate::api::responses::UserResponse;
use crate::api::state::AppState;
use crate::auth::jwt::{Claims, TokenType};
use crate::domain::repositories::{BlacklistedToken, Constraint};
use crate::domain::user::{LoginInput, NewUser, RegistrationInput};
use crate::domain::validation::{FieldErrors, REQUIRED};

/// Response from successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub message: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
}

/// Body of logout and refresh requests
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// A rotated token pair
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

impl RefreshRequest {
    fn token(self) -> Result<String, ApiError> {
        self.refresh
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::validation(FieldErrors::single("refresh", REQUIRED)))
    }
}

fn blacklist_entry(claims: &Claims) -> BlacklistedToken {
    BlacklistedToken {
        jti: claims.jti,
        user_id: claims.sub,
        expires_at: claims.expires_at(),
    }
}

/// Register a new user
///
/// POST /signup/
#[tracing::instrument(skip(state, input), fields(username = ?input.username))]
pub async fn register(
    State(state): State<AppState>,
    Payload(input): Payload<RegistrationInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let requested = input.username.as_deref().map(str::trim).map(str::to_string);
    let validated = input.validate();

    let mut errors = validated.as_ref().err().cloned().unwrap_or_default();
    if let Some(username) = requested.filter(|_| !errors.contains("username")) {
        if state.users.find_by_username(&username).await?.is_some() {
            let taken = Constraint::UniqueUsername;
            errors.add(taken.field(), taken.message());
        }
    }

    let registration = match validated {
        Ok(registration) if errors.is_empty() => registration,
        _ => return Err(ApiError::validation(errors)),
    };

    let password_hash = state.passwords.hash_async(registration.password).await?;

    // The unique index still guards against a concurrent signup
    let user = state
        .users
        .create(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
            message: "User created successfully".to_string(),
        }),
    ))
}

/// Login with username and password
///
/// POST /login/
#[tracing::instrument(skip(state, input), fields(username = ?input.username))]
pub async fn login(
    State(state): State<AppState>,
    Payload(input): Payload<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    let credentials = input.validate()?;

    let user = state.users.find_by_username(&credentials.username).await?;

    // Unknown users still pay for a bcrypt comparison
    let valid = state
        .passwords
        .verify_async(
            credentials.password,
            user.as_ref().map(|u| u.password_hash.clone()),
        )
        .await?;

    let user = match user {
        Some(user) if valid && user.is_active => user,
        _ => {
            tracing::warn!("Failed login attempt");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    if let Err(e) = state.users.update_last_login(user.id).await {
        tracing::warn!(error = %e, user_id = user.id, "Failed to record last login");
    }

    let pair = state.tokens.issue_pair(user.id)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: UserResponse::from(&user),
    }))
}

/// Revoke the caller's refresh token
///
/// POST /logout/
#[tracing::instrument(skip(state, user, req), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    JwtAuth(user): JwtAuth,
    Payload(req): Payload<RefreshRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let token = req.token()?;
    let invalid = || ApiError::bad_request("Invalid token.");

    let claims = state
        .tokens
        .verify(&token, TokenType::Refresh)
        .map_err(|_| invalid())?;

    if claims.sub != user.id {
        tracing::warn!(token_owner = claims.sub, "Logout with another user's token");
        return Err(invalid());
    }

    if !state.blacklist.blacklist(blacklist_entry(&claims)).await? {
        return Err(invalid());
    }

    tracing::info!(jti = %claims.jti, "Refresh token revoked");

    Ok((
        StatusCode::RESET_CONTENT,
        Json(json!({"detail": "Logout successful."})),
    ))
}

/// Exchange a refresh token for a new pair
///
/// The presented token is blacklisted in the same step, so it works once.
///
/// POST /token/refresh/
#[tracing::instrument(skip(state, req))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Payload(req): Payload<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let token = req.token()?;
    let claims = state.tokens.verify(&token, TokenType::Refresh)?;
    let rejected = || ApiError::unauthorized("Token is invalid or expired");

    if !state.blacklist.blacklist(blacklist_entry(&claims)).await? {
        tracing::warn!(jti = %claims.jti, "Blacklisted refresh token presented");
        return Err(rejected());
    }

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(rejected)?;

    let pair = state.tokens.issue_pair(user.id)?;

    tracing::debug!(user_id = user.id, "Refresh token rotated");

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /
pub async fn home() -> Redirect {
    Redirect::temporary("/signup/")
}
