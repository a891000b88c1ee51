//! Data store configuration

use std::{str::FromStr, sync::Arc};

use crate::config::{env_required, env_string};

use super::errors::StorageError;
use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

/// Table prefix applied when `DB_TABLE_PREFIX` is not set
pub const DEFAULT_TABLE_PREFIX: &str = "forum_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    Sqlite,
    Postgres,
}

impl FromStr for StoreType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            t => Err(StorageError::Config(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub store_type: StoreType,
    pub url: String,
    pub table_prefix: String,
}

impl StorageConfig {
    pub fn new(store_type: StoreType, url: impl Into<String>) -> Self {
        Self {
            store_type,
            url: url.into(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, StorageError> {
        let store_type = env_required("GENERIC_DATA_STORE_TYPE")?.parse()?;
        let url = env_required("GENERIC_DATA_STORE_URL")?;
        let table_prefix =
            env_string("DB_TABLE_PREFIX").unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string());

        Ok(Self {
            store_type,
            url,
            table_prefix,
        })
    }

    /// Build a lazily connecting data store for this configuration
    pub fn connect(&self) -> Result<Arc<dyn DataStore>, StorageError> {
        tracing::info!(
            store_type = ?self.store_type,
            table_prefix = %self.table_prefix,
            "Initializing data store"
        );

        let store: Arc<dyn DataStore> = match self.store_type {
            StoreType::Sqlite => {
                let opts = sqlx::sqlite::SqliteConnectOptions::from_str(&self.url)
                    .map_err(|e| StorageError::Config(e.to_string()))?
                    .create_if_missing(true);
                Arc::new(SqliteDataStore::new(
                    sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
                    self.table_prefix.clone(),
                ))
            }
            StoreType::Postgres => Arc::new(PostgresDataStore::new(
                sqlx::PgPool::connect_lazy(&self.url)
                    .map_err(|e| StorageError::Config(e.to_string()))?,
                self.table_prefix.clone(),
            )),
        };

        Ok(store)
    }
}
