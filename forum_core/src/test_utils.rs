//! Test utilities shared by the unit tests across the crate
//!
//! Every store test gets its own in-memory SQLite database. The pool is capped
//! at a single connection that never idles out, because each SQLite
//! connection to `sqlite::memory:` would otherwise see a separate database.

use std::env;
use std::sync::{Arc, Once};

use sqlx::sqlite::SqlitePoolOptions;

use crate::storage::{DEFAULT_TABLE_PREFIX, DataStore, SqliteDataStore};
use crate::userdb::NewUser;

/// Load `.env_test` (falling back to `.env`) once per test binary
pub(crate) fn load_test_env() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// Fresh, empty in-memory data store
pub(crate) async fn test_data_store() -> Arc<dyn DataStore> {
    load_test_env();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    Arc::new(SqliteDataStore::new(pool, DEFAULT_TABLE_PREFIX))
}

pub(crate) fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        name: Some(format!("{username} test")),
        email: email.to_string(),
        active: true,
        approved: true,
        trust_level: 1,
    }
}

/// Sets or clears an environment variable and restores it on drop
pub(crate) struct EnvVarGuard {
    key: String,
    original_value: Option<String>,
}

impl EnvVarGuard {
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let original_value = env::var(key).ok();
        // Callers run under #[serial], so no other test touches the environment
        unsafe {
            env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            original_value,
        }
    }

    pub(crate) fn unset(key: &str) -> Self {
        let original_value = env::var(key).ok();
        unsafe {
            env::remove_var(key);
        }
        Self {
            key: key.to_string(),
            original_value,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original_value {
                Some(value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }
}
