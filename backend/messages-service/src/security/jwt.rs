//! JWT token validation (HS256). Tokens are issued by the identity service;
//! this service only needs to validate them and read the subject. Token
//! generation is kept for the test suites.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

// Keys loaded from configuration at startup.
static JWT_KEYS: Lazy<RwLock<Option<(EncodingKey, DecodingKey)>>> =
    Lazy::new(|| RwLock::new(None));

/// Initialize JWT keys from the shared secret. Must be called during
/// application startup before any token operation.
pub fn initialize_keys(secret: &str) -> Result<(), AppError> {
    if secret.is_empty() {
        return Err(AppError::Config("JWT_SECRET must not be empty".into()));
    }
    let mut keys = JWT_KEYS
        .write()
        .map_err(|_| AppError::Config("JWT key slot poisoned".into()))?;
    *keys = Some((
        EncodingKey::from_secret(secret.as_bytes()),
        DecodingKey::from_secret(secret.as_bytes()),
    ));
    Ok(())
}

fn get_encoding_key() -> Result<EncodingKey, AppError> {
    let keys = JWT_KEYS
        .read()
        .map_err(|_| AppError::Config("JWT key slot poisoned".into()))?;
    keys.as_ref()
        .map(|(enc, _)| enc.clone())
        .ok_or_else(|| AppError::Config("JWT keys not initialized".into()))
}

fn get_decoding_key() -> Result<DecodingKey, AppError> {
    let keys = JWT_KEYS
        .read()
        .map_err(|_| AppError::Config("JWT key slot poisoned".into()))?;
    keys.as_ref()
        .map(|(_, dec)| dec.clone())
        .ok_or_else(|| AppError::Config("JWT keys not initialized".into()))
}

/// Generate an access token for the user.
pub fn generate_token(user_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS)).timestamp(),
    };

    let encoding_key = get_encoding_key()?;
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("failed to generate token: {e}")))
}

/// Validate and decode a token.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>, AppError> {
    let decoding_key = get_decoding_key()?;
    decode::<Claims>(
        token,
        &decoding_key,
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map_err(|e| AppError::Authentication(format!("token validation failed: {e}")))
}
