// src/auth.rs

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use dotenvy::dotenv;

static CONFIG: Lazy<Result<AuthConfig, AuthError>> = Lazy::new(|| {
    dotenv().ok();
    AuthConfig::from_env()
});

#[derive(Debug, Clone)]
pub enum AuthError {
    EnvVarNotFound(String),
    InvalidToken(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken(e.to_string())
    }
}

impl From<std::env::VarError> for AuthError {
    fn from(_: std::env::VarError) -> Self {
        AuthError::EnvVarNotFound("JWT_SECRET".to_string())
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::EnvVarNotFound(var) => write!(f, "Environment variable not set: {}", var),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

struct AuthConfig {
    secret: Vec<u8>,
}

impl AuthConfig {
    fn from_env() -> Result<Self, AuthError> {
        let secret = env::var("JWT_SECRET")?;
        Ok(Self {
            secret: secret.into_bytes(),
        })
    }
}

// === Claims ===

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // employee_id (uuid)
    pub exp: usize,
    pub iat: usize,
}

// === Функции ===

pub fn generate_token(employee_id: &str) -> Result<String, AuthError> {
    let config = CONFIG.as_ref().map_err(|e| e.clone())?;

    let encoding_key = EncodingKey::from_secret(&config.secret);

    let header = Header {
        alg: Algorithm::HS256,
        ..Header::default()
    };

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: employee_id.to_owned(),
        exp: now + 24 * 3600,
        iat: now,
    };

    encode(&header, &claims, &encoding_key).map_err(Into::into)
}

pub fn validate_token(token: &str) -> Result<Claims, AuthError> {
    let config = CONFIG.as_ref().map_err(|e| e.clone())?;

    let decoding_key = DecodingKey::from_secret(&config.secret);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(data.claims)
}
