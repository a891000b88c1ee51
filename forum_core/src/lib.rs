//! forum_core - third-party sign-in and first-boot seeding for forum sites
//!
//! The crate holds two independent pieces:
//!
//! - [`auth`]: the [`Authenticator`] contract and its Google OAuth2
//!   implementation, including optional Workspace group lookup through a
//!   service account.
//! - [`seed`]: the [`CategorySeeder`], which creates and reconciles the
//!   default content categories.
//!
//! Both persist through the stores in this crate, which run on SQLite or
//! PostgreSQL via [`StorageConfig`].

pub mod auth;
pub mod category;
mod config;
pub mod seed;
pub mod settings;
mod storage;
pub mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use auth::{
    AuthError, AuthResult, AuthToken, Authenticator, AuthenticatorSet, OAuthMiddleware,
    Revocable, RevokeOutcome,
};
pub use config::{ConfigError, DEFAULT_TRUST_LEVEL, MAX_TRUST_LEVEL, UserDefaults};
pub use seed::{CategorySeeder, ReseedOption, SeedError, SeedText};
pub use storage::{
    DEFAULT_TABLE_PREFIX, DataStore, PostgresDataStore, SqliteDataStore, StorageConfig,
    StorageError, StoreType,
};
pub use utils::UtilError;
