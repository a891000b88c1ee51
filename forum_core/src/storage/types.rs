use sqlx::{Pool, Postgres, Sqlite};

// Types
#[derive(Clone, Debug)]
pub struct SqliteDataStore {
    pub(super) pool: sqlx::SqlitePool,
    pub(super) table_prefix: String,
}

#[derive(Clone, Debug)]
pub struct PostgresDataStore {
    pub(super) pool: sqlx::PgPool,
    pub(super) table_prefix: String,
}

impl SqliteDataStore {
    pub fn new(pool: sqlx::SqlitePool, table_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            table_prefix: table_prefix.into(),
        }
    }
}

impl PostgresDataStore {
    pub fn new(pool: sqlx::PgPool, table_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            table_prefix: table_prefix.into(),
        }
    }
}

// Trait
pub trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>>;
    fn as_postgres(&self) -> Option<&Pool<Postgres>>;
    fn table_prefix(&self) -> &str;

    /// Full table name for `name` under this store's prefix
    fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix(), name)
    }
}

// Store implementations
impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        Some(&self.pool)
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        None
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }
}

impl DataStore for PostgresDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        None
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        Some(&self.pool)
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }
}
