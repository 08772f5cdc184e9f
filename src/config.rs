use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::db::SqliteGateway;
use crate::error::AppError;
use crate::repository::{JsonFileGateway, PersistenceGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Json { data_dir: PathBuf },
    Sqlite { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "json".to_string());
        let storage = match backend.to_ascii_lowercase().as_str() {
            "json" => StorageBackend::Json {
                data_dir: lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()).into(),
            },
            "sqlite" => StorageBackend::Sqlite {
                database_url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite://thesis.db?mode=rwc".to_string()),
            },
            other => {
                return Err(AppError::Config(format!(
                    "STORAGE_BACKEND must be 'json' or 'sqlite', got '{}'",
                    other
                )));
            }
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        Ok(Self { storage, bind_addr })
    }

    pub async fn connect_storage(&self) -> Result<Arc<dyn PersistenceGateway>, AppError> {
        let gateway: Arc<dyn PersistenceGateway> = match &self.storage {
            StorageBackend::Json { data_dir } => Arc::new(JsonFileGateway::new(data_dir.clone())),
            StorageBackend::Sqlite { database_url } => {
                Arc::new(SqliteGateway::connect(database_url).await?)
            }
        };
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Json { data_dir: PathBuf::from("data") }
        );
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_sqlite_backend() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "SQLite"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Sqlite { database_url: "sqlite::memory:".to_string() }
        );
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "csv")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])),
            Err(AppError::Config(_))
        ));
    }
}
