//! Token signing configuration.
//!
//! Access and refresh tokens are signed with distinct secrets so that
//! recovering one secret never allows forging the other kind of token.
//!
//! # Environment Variables
//!
//! - `JWT_ACCESS_SECRET`: HMAC secret for access tokens (required)
//! - `JWT_ACCESS_EXPIRY`: access token lifetime in seconds (required)
//! - `JWT_REFRESH_SECRET`: HMAC secret for refresh tokens (required, must differ)
//! - `JWT_REFRESH_EXPIRY`: refresh token lifetime in seconds (required)

use std::env;

use crate::{ConfigError, parse, required};

/// Ten years. Longer lifetimes would overflow expiry timestamps.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_token_expiry: i64,
    pub refresh_secret: String,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = required(lookup, "JWT_ACCESS_SECRET")?;
        let access_token_expiry = lifetime(lookup, "JWT_ACCESS_EXPIRY")?;
        let refresh_secret = required(lookup, "JWT_REFRESH_SECRET")?;
        let refresh_token_expiry = lifetime(lookup, "JWT_REFRESH_EXPIRY")?;

        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_SECRET",
                value: "<redacted>".to_string(),
                reason: "must differ from JWT_ACCESS_SECRET".to_string(),
            });
        }

        Ok(Self {
            access_secret,
            access_token_expiry,
            refresh_secret,
            refresh_token_expiry,
        })
    }
}

fn lifetime<F>(lookup: &F, key: &'static str) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required(lookup, key)?;
    let seconds: i64 = parse(key, value.clone())?;
    if seconds <= 0 {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "must be a positive number of seconds".to_string(),
        });
    }
    if seconds > MAX_TOKEN_LIFETIME_SECS {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: format!("must be at most {MAX_TOKEN_LIFETIME_SECS} seconds"),
        });
    }
    Ok(seconds)
}

// Secrets stay out of logs and panic messages.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}
