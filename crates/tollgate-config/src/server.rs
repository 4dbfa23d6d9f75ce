//! HTTP server settings.
//!
//! # Environment Variables
//!
//! - `PORT`: listen port (default: 3000)
//! - `SESSION_SWEEP_INTERVAL_SECS`: how often expired refresh sessions are
//!   purged (default: 300)
//! - `LOG_DIR`: when set, structured JSON logs are also written to a
//!   daily-rolling file in this directory

use std::env;
use std::time::Duration;

use crate::{ConfigError, parsed_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub session_sweep_interval: Duration,
    pub log_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            session_sweep_interval: Duration::from_secs(300),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sweep_secs: u64 = parsed_or(lookup, "SESSION_SWEEP_INTERVAL_SECS", 300)?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            port: parsed_or(lookup, "PORT", 3000)?,
            session_sweep_interval: Duration::from_secs(sweep_secs),
            log_dir: lookup("LOG_DIR").filter(|dir| !dir.trim().is_empty()),
        })
    }
}
