//! Application configuration read from the environment at startup.

use std::env;
use std::net::SocketAddr;

use chrono::Duration;
use tracing::warn;

use crate::domain::DeletePolicy;

/// Fallback token secret, usable only in debug builds.
#[cfg(debug_assertions)]
const DEV_TOKEN_SECRET: &str = "dev-only-token-secret";

/// Default token lifetime in seconds (one hour, as the original API issued).
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Default connection-pool size.
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Process configuration, read once in `main` and injected from there.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub delete_policy: DeletePolicy,
    pub pool_max_size: u32,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required. `BIND_ADDR` defaults to `0.0.0.0:8080`,
    /// `TOKEN_TTL_SECS` to one hour, `POOL_MAX_SIZE` to 10, and
    /// `DELETE_POLICY` to `restrict`.
    /// `TOKEN_SECRET` is required in release builds; debug builds fall back
    /// to a fixed development secret with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().map_err(|err| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: format!("{err}"),
            })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let token_secret = match env::var("TOKEN_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            #[cfg(debug_assertions)]
            _ => {
                warn!("TOKEN_SECRET not set, using development fallback (debug builds only)");
                DEV_TOKEN_SECRET.to_owned()
            }
            #[cfg(not(debug_assertions))]
            _ => {
                return Err(ConfigError::Missing {
                    name: "TOKEN_SECRET",
                });
            }
        };

        let token_ttl_secs = match env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw.parse::<i64>().map_err(|err| ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                message: format!("{err}"),
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };
        if token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                message: "must be positive".to_owned(),
            });
        }

        let pool_max_size = match env::var("POOL_MAX_SIZE") {
            Ok(raw) => {
                let size = raw.parse::<u32>().map_err(|err| ConfigError::Invalid {
                    name: "POOL_MAX_SIZE",
                    message: format!("{err}"),
                })?;
                if size == 0 {
                    return Err(ConfigError::Invalid {
                        name: "POOL_MAX_SIZE",
                        message: "must be positive".to_owned(),
                    });
                }
                size
            }
            Err(_) => DEFAULT_POOL_MAX_SIZE,
        };

        let delete_policy = match env::var("DELETE_POLICY") {
            Ok(raw) => raw
                .parse::<DeletePolicy>()
                .map_err(|message| ConfigError::Invalid {
                    name: "DELETE_POLICY",
                    message,
                })?,
            Err(_) => DeletePolicy::default(),
        };

        Ok(Self {
            database_url,
            bind_addr,
            token_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
            delete_policy,
            pool_max_size,
        })
    }
}
