//! Configuration loading and representation.
//!
//! Everything comes from environment variables. Parsing goes through a lookup
//! function so tests can supply values without touching the process env.

use std::net::SocketAddr;

use thiserror::Error;

use rolegate_auth::{HashError, HashParams};

pub const BIND_ADDR: &str = "ROLEGATE_BIND_ADDR";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const HASH_MEMORY_KIB: &str = "ROLEGATE_HASH_MEMORY_KIB";
pub const HASH_ITERATIONS: &str = "ROLEGATE_HASH_ITERATIONS";
pub const HASH_PARALLELISM: &str = "ROLEGATE_HASH_PARALLELISM";
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "ROLEGATE_BOOTSTRAP_ADMIN_USERNAME";
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "ROLEGATE_BOOTSTRAP_ADMIN_PASSWORD";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Credentials for the account seeded with `ADMIN` at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub hash: HashParams,
    pub bootstrap_admin: Option<AdminCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: BIND_ADDR,
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let defaults = HashParams::default();
        let hash = HashParams {
            memory_kib: parse_u32(HASH_MEMORY_KIB, get(HASH_MEMORY_KIB), defaults.memory_kib)?,
            iterations: parse_u32(HASH_ITERATIONS, get(HASH_ITERATIONS), defaults.iterations)?,
            parallelism: parse_u32(HASH_PARALLELISM, get(HASH_PARALLELISM), defaults.parallelism)?,
        };
        hash.validate()?;

        let bootstrap_admin = match (get(BOOTSTRAP_ADMIN_USERNAME), lookup(BOOTSTRAP_ADMIN_PASSWORD)) {
            (Some(username), Some(password)) if !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    BOOTSTRAP_ADMIN_USERNAME,
                    BOOTSTRAP_ADMIN_PASSWORD,
                ));
            }
        };

        Ok(Self {
            bind_addr,
            database_url: get(DATABASE_URL),
            hash,
            bootstrap_admin,
        })
    }
}

fn parse_u32(key: &'static str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }
        }),
    }
}
