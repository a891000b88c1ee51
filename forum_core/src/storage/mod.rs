mod config;
mod errors;
mod types;

pub use config::{DEFAULT_TABLE_PREFIX, StorageConfig, StoreType};
pub use errors::StorageError;
pub use types::{DataStore, PostgresDataStore, SqliteDataStore};

/// Error message shared by stores when handed a data store they cannot drive
pub(crate) const UNSUPPORTED_STORE: &str = "Unsupported database type";
