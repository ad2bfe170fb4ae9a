use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod gateway;
pub mod guards;
pub mod session;

pub use gateway::{AuthGateway, AuthSession, HostedAuthGateway};
pub use guards::{require_auth, require_role};
pub use session::{get_user, get_user_profile, get_user_with_profile, Session};

/// Session token claims as issued by the hosted auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

fn default_role() -> String {
    "authenticated".to_string()
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, audience: &str, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role: default_role(),
            aud: audience.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Authenticated identity derived from a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session token present")]
    MissingToken,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Auth is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Auth code exchange failed: {0}")]
    Exchange(String),
}

/// Sign a session token (HS256)
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured("AUTH_JWT_SECRET"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Verify signature, expiry and audience of a session token
pub fn decode_token(token: &str, secret: &str, audience: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured("AUTH_JWT_SECRET"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
