//! Stores and fixtures shared by the integration tests

use std::sync::Arc;

use forum_core::auth::accounts::AccountStore;
use forum_core::category::CategoryStore;
use forum_core::settings::SiteSettingStore;
use forum_core::userdb::UserStore;
use forum_core::{DEFAULT_TABLE_PREFIX, DataStore, SqliteDataStore};
use sqlx::sqlite::SqlitePoolOptions;

pub const SERVICE_ACCOUNT_EMAIL: &str = "groups-reader@forum-test.iam.gserviceaccount.com";
pub const PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/service_account_key.pub.pem");

/// Contents of a service account key file for the fixture key pair
pub fn service_account_json() -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "forum-test",
        "private_key_id": "fixture",
        "private_key": PRIVATE_KEY,
        "client_email": SERVICE_ACCOUNT_EMAIL,
        "client_id": "1234567890",
        "token_uri": "https://oauth2.googleapis.com/token"
    })
    .to_string()
}

/// Every store, initialized on one fresh in-memory database
pub struct TestStores {
    pub users: UserStore,
    pub accounts: AccountStore,
    pub categories: CategoryStore,
    pub settings: SiteSettingStore,
}

impl TestStores {
    pub async fn new() -> Self {
        // One connection that never recycles, otherwise each connection
        // opens its own empty in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite database");
        let store: Arc<dyn DataStore> = Arc::new(SqliteDataStore::new(pool, DEFAULT_TABLE_PREFIX));

        let stores = Self {
            users: UserStore::new(store.clone()),
            accounts: AccountStore::new(store.clone()),
            categories: CategoryStore::new(store.clone()),
            settings: SiteSettingStore::new(store),
        };

        stores.users.init().await.expect("user store init");
        stores.accounts.init().await.expect("account store init");
        stores.categories.init().await.expect("category store init");
        stores.settings.init().await.expect("setting store init");

        stores
    }
}
