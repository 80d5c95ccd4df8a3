use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::Claims;
use crate::entities::user::Role;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

/// Default token lifetime
pub const DEFAULT_EXPIRATION_HOURS: i64 = 72;

/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 365;

/// Settings for issuing and checking tokens
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret shared by issuer and validator
    pub secret: String,
    /// `iss` claim written and required on validation
    pub issuer: String,
    /// Token lifetime
    pub expiration: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "hospital-api".to_string(),
            expiration: Duration::hours(DEFAULT_EXPIRATION_HOURS),
        }
    }

    /// Load `JWT_SECRET` (required), `JWT_ISSUER` and `TOKEN_EXPIRATION_HOURS`
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;

        if secret.is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET must not be empty".to_string()));
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "hospital-api".to_string());

        let expiration = match env::var("TOKEN_EXPIRATION_HOURS") {
            Ok(raw) => parse_expiration_hours(&raw)?,
            Err(_) => Duration::hours(DEFAULT_EXPIRATION_HOURS),
        };

        Ok(Self {
            secret,
            issuer,
            expiration,
        })
    }
}

/// Parse a token lifetime in hours, between 1 and [`MAX_EXPIRATION_HOURS`]
pub fn parse_expiration_hours(raw: &str) -> Result<Duration, SecurityError> {
    let hours = raw.trim().parse::<i64>().map_err(|_| {
        SecurityError::ConfigError(format!("TOKEN_EXPIRATION_HOURS is not a number: {}", raw))
    })?;

    if !(1..=MAX_EXPIRATION_HOURS).contains(&hours) {
        return Err(SecurityError::ConfigError(format!(
            "TOKEN_EXPIRATION_HOURS must be between 1 and {}, got {}",
            MAX_EXPIRATION_HOURS, hours
        )));
    }

    Ok(Duration::hours(hours))
}

/// Issues and validates HS256 JWTs
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Lifetime of issued tokens in seconds
    pub fn expires_in(&self) -> i64 {
        self.config.expiration.num_seconds()
    }

    /// Generate a new JWT for a user
    pub fn generate_token(&self, username: &str, role: Role) -> Result<String, SecurityError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration;

        let claims = Claims {
            sub: username.to_string(),
            role,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Never log the token itself
        info!("Generated token for user {}", username);
        debug!("Token expiration: {}", expiration);

        Ok(token)
    }

    /// Validate a JWT and return the decoded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                SecurityError::TokenValidation("Invalid signature".to_string())
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}
