use std::sync::Arc;

use crate::storage::{DataStore, UNSUPPORTED_STORE};

use super::errors::SettingError;
use super::postgres::*;
use super::sqlite::*;

const SETTINGS_TABLE: &str = "site_settings";

/// Site-wide key/value settings
#[derive(Clone)]
pub struct SiteSettingStore {
    store: Arc<dyn DataStore>,
}

impl SiteSettingStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn table(&self) -> String {
        self.store.table(SETTINGS_TABLE)
    }

    pub async fn init(&self) -> Result<(), SettingError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool, &table).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool, &table).await
        } else {
            Err(SettingError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    pub async fn get_string(&self, name: &str) -> Result<Option<String>, SettingError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            get_setting_sqlite(pool, &table, name).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_setting_postgres(pool, &table, name).await
        } else {
            Err(SettingError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Integer value of `name`; missing or unparseable values read as 0
    pub async fn get_i64(&self, name: &str) -> Result<i64, SettingError> {
        let value = self.get_string(name).await?;
        Ok(value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0))
    }

    #[tracing::instrument(skip(self))]
    pub async fn set(&self, name: &str, value: &str) -> Result<(), SettingError> {
        if name.trim().is_empty() {
            return Err(SettingError::InvalidName(name.to_string()));
        }

        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            set_setting_sqlite(pool, &table, name, value).await?;
        } else if let Some(pool) = self.store.as_postgres() {
            set_setting_postgres(pool, &table, name, value).await?;
        } else {
            return Err(SettingError::Storage(UNSUPPORTED_STORE.to_string()));
        }

        tracing::debug!("Site setting updated");
        Ok(())
    }
}
