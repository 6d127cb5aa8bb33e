//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Read process settings once at startup.
//! - Reject malformed values before any resource is opened.
//!
//! # Invariants
//! - Empty variables are treated as unset.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use user_api_core::default_log_level;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "data/app.db";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Storage backend selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub backend: StorageBackend,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr_raw = read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| invalid("BIND_ADDR", &bind_addr_raw, err))?;

        let backend = match read("STORAGE_BACKEND") {
            None => StorageBackend::Sqlite,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "sqlite" => StorageBackend::Sqlite,
                "memory" => StorageBackend::Memory,
                _ => return Err(invalid("STORAGE_BACKEND", &raw, "expected sqlite|memory")),
            },
        };

        let request_timeout = match read("REQUEST_TIMEOUT_MS") {
            None => Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(invalid("REQUEST_TIMEOUT_MS", &raw, "must be positive")),
                Ok(ms) => Duration::from_millis(ms),
                Err(err) => return Err(invalid("REQUEST_TIMEOUT_MS", &raw, err)),
            },
        };

        Ok(Self {
            bind_addr,
            backend,
            db_path: PathBuf::from(read("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            log_level: read("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read("LOG_DIR"),
            request_timeout,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, StorageBackend, DEFAULT_DB_PATH};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, super::ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.db_path.to_str(), Some(DEFAULT_DB_PATH));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.request_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn empty_db_path_falls_back_to_default() {
        let config = config_from(&[("DB_PATH", "")]).unwrap();
        assert_eq!(config.db_path.to_str(), Some(DEFAULT_DB_PATH));
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("STORAGE_BACKEND", "Memory"),
            ("DB_PATH", "/tmp/users.db"),
            ("LOG_LEVEL", "warn"),
            ("LOG_DIR", "/var/log/user-api"),
            ("REQUEST_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.db_path.to_str(), Some("/tmp/users.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/user-api"));
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config_from(&[("BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert_eq!(err.key, "BIND_ADDR");

        let err = config_from(&[("STORAGE_BACKEND", "postgres")]).unwrap_err();
        assert_eq!(err.key, "STORAGE_BACKEND");

        let err = config_from(&[("REQUEST_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }
}
