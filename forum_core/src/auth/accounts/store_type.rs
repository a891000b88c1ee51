use std::sync::Arc;

use crate::storage::{DataStore, UNSUPPORTED_STORE};

use super::errors::AccountError;
use super::postgres::*;
use super::sqlite::*;
use super::types::{AssociatedAccount, NewAssociatedAccount};

const ACCOUNTS_TABLE: &str = "user_associated_accounts";

/// Storage for provider identities linked to local users
#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn DataStore>,
}

impl AccountStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn table(&self) -> String {
        self.store.table(ACCOUNTS_TABLE)
    }

    pub async fn init(&self) -> Result<(), AccountError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool, &table).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool, &table).await
        } else {
            Err(AccountError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Insert the association, or refresh it when `(provider_name, provider_uid)` exists
    #[tracing::instrument(skip(self, account), fields(
        provider = %account.provider_name,
        user_id = account.user_id
    ))]
    pub async fn upsert(
        &self,
        account: NewAssociatedAccount,
    ) -> Result<AssociatedAccount, AccountError> {
        if account.provider_uid.is_empty() {
            return Err(AccountError::InvalidData(
                "Provider uid cannot be empty".to_string(),
            ));
        }

        let table = self.table();

        let result = if let Some(pool) = self.store.as_sqlite() {
            upsert_account_sqlite(pool, &table, account).await
        } else if let Some(pool) = self.store.as_postgres() {
            upsert_account_postgres(pool, &table, account).await
        } else {
            Err(AccountError::Storage(UNSUPPORTED_STORE.to_string()))
        };

        match &result {
            Ok(saved) => tracing::debug!(account_id = saved.id, "Associated account saved"),
            Err(e) => tracing::error!(error = %e, "Failed to save associated account"),
        }

        result
    }

    pub async fn find_by_provider_uid(
        &self,
        provider_name: &str,
        provider_uid: &str,
    ) -> Result<Option<AssociatedAccount>, AccountError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            get_account_by_provider_uid_sqlite(pool, &table, provider_name, provider_uid).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_account_by_provider_uid_postgres(pool, &table, provider_name, provider_uid).await
        } else {
            Err(AccountError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Most recently used association of `user_id` with `provider_name`
    pub async fn find_for_user(
        &self,
        provider_name: &str,
        user_id: i64,
    ) -> Result<Option<AssociatedAccount>, AccountError> {
        let table = self.table();

        if let Some(pool) = self.store.as_sqlite() {
            get_account_for_user_sqlite(pool, &table, provider_name, user_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_account_for_user_postgres(pool, &table, provider_name, user_id).await
        } else {
            Err(AccountError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Remove every association of `user_id` with `provider_name`, returning how many went
    #[tracing::instrument(skip(self))]
    pub async fn delete_for_user(
        &self,
        provider_name: &str,
        user_id: i64,
    ) -> Result<u64, AccountError> {
        let table = self.table();

        let deleted = if let Some(pool) = self.store.as_sqlite() {
            delete_accounts_for_user_sqlite(pool, &table, provider_name, user_id).await?
        } else if let Some(pool) = self.store.as_postgres() {
            delete_accounts_for_user_postgres(pool, &table, provider_name, user_id).await?
        } else {
            return Err(AccountError::Storage(UNSUPPORTED_STORE.to_string()));
        };

        tracing::info!(deleted, "Associated accounts removed");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_data_store;
    use serde_json::json;

    async fn account_store() -> AccountStore {
        let store = AccountStore::new(test_data_store().await);
        store.init().await.expect("Failed to initialize AccountStore");
        store
    }

    fn google_account(uid: &str, user_id: i64, email: &str) -> NewAssociatedAccount {
        NewAssociatedAccount {
            provider_name: "google_oauth2".to_string(),
            provider_uid: uid.to_string(),
            user_id,
            email: Some(email.to_string()),
            name: Some("Test User".to_string()),
            info: json!({ "email": email }),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = account_store().await;

        let first = store
            .upsert(google_account("uid-1", 7, "old@example.com"))
            .await
            .expect("insert should succeed");
        assert_eq!(first.user_id, 7);
        assert_eq!(first.info["email"], "old@example.com");

        let second = store
            .upsert(google_account("uid-1", 7, "new@example.com"))
            .await
            .expect("update should succeed");
        assert_eq!(second.id, first.id);
        assert_eq!(second.email.as_deref(), Some("new@example.com"));
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_find_by_provider_uid_is_scoped_to_provider() {
        let store = account_store().await;
        store
            .upsert(google_account("uid-2", 3, "a@example.com"))
            .await
            .expect("insert should succeed");

        assert!(
            store
                .find_by_provider_uid("google_oauth2", "uid-2")
                .await
                .expect("query")
                .is_some()
        );
        assert!(
            store
                .find_by_provider_uid("github", "uid-2")
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let store = account_store().await;
        store
            .upsert(google_account("uid-3", 9, "b@example.com"))
            .await
            .expect("insert should succeed");

        let deleted = store
            .delete_for_user("google_oauth2", 9)
            .await
            .expect("delete should succeed");
        assert_eq!(deleted, 1);
        assert!(
            store
                .find_for_user("google_oauth2", 9)
                .await
                .expect("query")
                .is_none()
        );

        let again = store
            .delete_for_user("google_oauth2", 9)
            .await
            .expect("delete should succeed");
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn test_empty_uid_is_rejected() {
        let store = account_store().await;
        let result = store.upsert(google_account("", 1, "c@example.com")).await;
        assert!(matches!(result, Err(AccountError::InvalidData(_))));
    }
}
