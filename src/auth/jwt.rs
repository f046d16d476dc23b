// JWT token creation and verification
// Short-lived access tokens plus rotating refresh tokens, both HS256

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which kind of token a set of claims belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user id)
/// * `exp` - Expiry time (seconds since epoch)
/// * `iat` - Issue time (seconds since epoch)
/// * `jti` - Unique token id, the blacklist key
/// * `token_type` - Access or refresh
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
    pub token_type: TokenType,
}

impl Claims {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to create token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Token is invalid or expired: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("Token has wrong type: expected {expected:?}")]
    WrongType { expected: TokenType },
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Claims of `refresh`, kept so callers need not decode it again
    pub refresh_claims: Claims,
}

/// Issues and verifies tokens with one shared secret
///
/// # Example
/// ```
/// use ipo_listings_api::auth::jwt::{TokenService, TokenType};
///
/// let tokens = TokenService::new("your-secret-key", 300, 86_400);
/// let pair = tokens.issue_pair(42).expect("valid tokens");
///
/// let claims = tokens.verify(&pair.access, TokenType::Access).expect("valid token");
/// assert_eq!(claims.sub, 42);
/// assert!(tokens.verify(&pair.access, TokenType::Refresh).is_err());
/// ```
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service
    ///
    /// # Arguments
    /// * `secret` - HMAC signing key
    /// * `access_ttl_secs` - Lifetime of access tokens
    /// * `refresh_ttl_secs` - Lifetime of refresh tokens
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Creates an access token for a user
    pub fn create_access_token(&self, user_id: i64) -> Result<String, TokenError> {
        let claims = self.claims(user_id, TokenType::Access);
        self.sign(&claims)
    }

    /// Creates a refresh token and the access token derived from it
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        let refresh_claims = self.claims(user_id, TokenType::Refresh);
        let refresh = self.sign(&refresh_claims)?;
        let access = self.create_access_token(user_id)?;

        Ok(TokenPair {
            access,
            refresh,
            refresh_claims,
        })
    }

    /// Verifies signature, expiry and type, returning the claims
    ///
    /// Expiry is checked without leeway.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)?;

        if claims.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }

        Ok(claims)
    }

    fn claims(&self, user_id: i64, token_type: TokenType) -> Claims {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        Claims {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding).map_err(TokenError::Encode)
    }
}
