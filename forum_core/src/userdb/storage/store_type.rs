use std::sync::Arc;

use crate::storage::{DataStore, UNSUPPORTED_STORE};
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User},
};

use super::postgres::*;
use super::sqlite::*;

const USERS_TABLE: &str = "users";

/// Local account storage
#[derive(Clone)]
pub struct UserStore {
    store: Arc<dyn DataStore>,
}

impl UserStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn table(&self) -> String {
        self.store.table(USERS_TABLE)
    }

    /// Create the users table and make sure the system account exists
    pub async fn init(&self) -> Result<(), UserError> {
        let table = self.table();

        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool, &table).await?;
                ensure_system_user_sqlite(pool, &table).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool, &table).await?;
                ensure_system_user_postgres(pool, &table).await
            }
            _ => Err(UserError::Storage(UNSUPPORTED_STORE.to_string())),
        }
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            get_user_by_id_sqlite(pool, &table, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_id_postgres(pool, &table, id).await
        } else {
            Err(UserError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Look up an account by email, ignoring case
    #[tracing::instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let table = self.table();

        let result = if let Some(pool) = self.store.as_sqlite() {
            get_user_by_email_sqlite(pool, &table, email).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_email_postgres(pool, &table, email).await
        } else {
            Err(UserError::Storage(UNSUPPORTED_STORE.to_string()))
        };

        match &result {
            Ok(Some(user)) => {
                tracing::debug!(found = true, user_id = user.id, "User lookup completed");
            }
            Ok(None) => {
                tracing::debug!(found = false, "User lookup completed - not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
            }
        }

        result
    }

    /// Whether any account already uses `username`, ignoring case
    pub async fn username_exists(&self, username: &str) -> Result<bool, UserError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            username_exists_sqlite(pool, &table, username).await
        } else if let Some(pool) = self.store.as_postgres() {
            username_exists_postgres(pool, &table, username).await
        } else {
            Err(UserError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Number of registered people, excluding the system account and bots
    pub async fn count_human_users(&self) -> Result<i64, UserError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            count_human_users_sqlite(pool, &table).await
        } else if let Some(pool) = self.store.as_postgres() {
            count_human_users_postgres(pool, &table).await
        } else {
            Err(UserError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Whether at least one person (not the system account) has registered
    pub async fn human_users_exist(&self) -> Result<bool, UserError> {
        Ok(self.count_human_users().await? > 0)
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, UserError> {
        if user.username.trim().is_empty() {
            return Err(UserError::InvalidData("Username cannot be empty".to_string()));
        }
        if user.email.trim().is_empty() {
            return Err(UserError::InvalidData("Email cannot be empty".to_string()));
        }

        let table = self.table();

        let result = if let Some(pool) = self.store.as_sqlite() {
            insert_user_sqlite(pool, &table, user).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_user_postgres(pool, &table, user).await
        } else {
            Err(UserError::Storage(UNSUPPORTED_STORE.to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(
                    user_id = user.id,
                    trust_level = user.trust_level,
                    "User created"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "User creation failed");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_user, test_data_store};
    use crate::userdb::types::{SYSTEM_USER_ID, SYSTEM_USERNAME};

    async fn user_store() -> UserStore {
        let store = UserStore::new(test_data_store().await);
        store.init().await.expect("Failed to initialize UserStore");
        store
    }

    #[tokio::test]
    async fn test_init_is_idempotent_and_creates_system_user() {
        let store = user_store().await;
        store.init().await.expect("second init should succeed");

        let system = store
            .find_by_id(SYSTEM_USER_ID)
            .await
            .expect("lookup should succeed")
            .expect("system user should exist");
        assert_eq!(system.username, SYSTEM_USERNAME);
        assert!(!system.is_human());
    }

    #[tokio::test]
    async fn test_system_user_does_not_count_as_human() {
        let store = user_store().await;
        assert!(!store.human_users_exist().await.expect("count should succeed"));

        store
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .expect("create should succeed");
        assert!(store.human_users_exist().await.expect("count should succeed"));
        assert_eq!(store.count_human_users().await.expect("count should succeed"), 1);
    }

    #[tokio::test]
    async fn test_create_and_find_by_email_ignores_case() {
        let store = user_store().await;
        let created = store
            .create_user(new_user("bob", "Bob@Example.com"))
            .await
            .expect("create should succeed");
        assert!(created.id > 0);
        assert_eq!(created.username, "bob");

        let found = store
            .find_by_email("bob@example.COM")
            .await
            .expect("lookup should succeed")
            .expect("user should be found");
        assert_eq!(found.id, created.id);

        assert!(
            store
                .find_by_email("nobody@example.com")
                .await
                .expect("lookup should succeed")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_username_exists_ignores_case() {
        let store = user_store().await;
        store
            .create_user(new_user("Carol", "carol@example.com"))
            .await
            .expect("create should succeed");

        assert!(store.username_exists("carol").await.expect("query"));
        assert!(store.username_exists("CAROL").await.expect("query"));
        assert!(!store.username_exists("carol1").await.expect("query"));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = user_store().await;
        store
            .create_user(new_user("dave", "dave@example.com"))
            .await
            .expect("create should succeed");

        let result = store
            .create_user(new_user("DAVE", "dave2@example.com"))
            .await;
        assert!(matches!(result, Err(UserError::Duplicate(_))));

        let result = store
            .create_user(new_user("dave2", "Dave@Example.com"))
            .await;
        assert!(matches!(result, Err(UserError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_empty_username_is_invalid() {
        let store = user_store().await;
        let result = store.create_user(new_user(" ", "eve@example.com")).await;
        assert!(matches!(result, Err(UserError::InvalidData(_))));
    }
}
