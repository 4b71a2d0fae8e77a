use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str =
    "api_server=debug,application=info,domain=info,infrastructure=info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which storage variant backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Only read when `storage_backend` is `Sqlite`.
    pub database_url: Option<String>,
    pub api_host: String,
    pub api_port: u16,
    pub upload_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Sqlite,
        };

        let database_url = var("DATABASE_URL");
        if storage_backend == StorageBackend::Sqlite && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let api_port = match var("API_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "API_PORT",
                value,
            })?,
            None => 5000,
        };

        Ok(Config {
            storage_backend,
            database_url,
            api_host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port,
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("server/uploads")),
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let config = load(&[("DATABASE_URL", "portfolio.db")]).unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.database_url.as_deref(), Some("portfolio.db"));
        assert_eq!(config.api_host, "0.0.0.0");
        assert_eq!(config.api_port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("server/uploads"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn sqlite_backend_requires_database_url() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
        assert_eq!(
            load(&[("DATABASE_URL", "  ")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn memory_backend_runs_without_database_url() {
        let config = load(&[("STORAGE_BACKEND", "Memory"), ("API_PORT", "8080")]).unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.api_port, 8080);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "postgres")]),
            Err(ConfigError::Invalid { name: "STORAGE_BACKEND", .. })
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "x.db"), ("API_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "API_PORT", .. })
        ));
    }
}
