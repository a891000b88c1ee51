use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::errors::AccountError;
use super::types::{AssociatedAccount, NewAssociatedAccount};

pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), AccountError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider_name TEXT NOT NULL,
            provider_uid TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            email TEXT,
            name TEXT,
            info TEXT NOT NULL,
            last_used TIMESTAMP NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            UNIQUE(provider_name, provider_uid)
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{table_name}_user_id ON {table_name}(user_id)
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_account_by_provider_uid_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    provider_name: &str,
    provider_uid: &str,
) -> Result<Option<AssociatedAccount>, AccountError> {
    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        SELECT * FROM {table_name}
        WHERE provider_name = ? AND provider_uid = ?
        "#
    ))
    .bind(provider_name)
    .bind(provider_uid)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn get_account_for_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    provider_name: &str,
    user_id: i64,
) -> Result<Option<AssociatedAccount>, AccountError> {
    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        SELECT * FROM {table_name}
        WHERE provider_name = ? AND user_id = ?
        ORDER BY last_used DESC
        LIMIT 1
        "#
    ))
    .bind(provider_name)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn upsert_account_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    account: NewAssociatedAccount,
) -> Result<AssociatedAccount, AccountError> {
    let now = Utc::now();
    let info = serde_json::to_string(&account.info)?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

    let existing: Option<i64> = sqlx::query_scalar(&format!(
        r#"
        SELECT id FROM {table_name}
        WHERE provider_name = ? AND provider_uid = ?
        "#
    ))
    .bind(&account.provider_name)
    .bind(&account.provider_uid)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    let account_id = if let Some(id) = existing {
        sqlx::query(&format!(
            r#"
            UPDATE {table_name} SET
                user_id = ?,
                email = ?,
                name = ?,
                info = ?,
                last_used = ?,
                updated_at = ?
            WHERE id = ?
            "#
        ))
        .bind(account.user_id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&info)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

        id
    } else {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {table_name}
                (provider_name, provider_uid, user_id, email, name, info, last_used, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        ))
        .bind(&account.provider_name)
        .bind(&account.provider_uid)
        .bind(account.user_id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&info)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

        result.last_insert_rowid()
    };

    tx.commit()
        .await
        .map_err(|e| AccountError::Storage(e.to_string()))?;

    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(account_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn delete_accounts_for_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    provider_name: &str,
    user_id: i64,
) -> Result<u64, AccountError> {
    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE provider_name = ? AND user_id = ?
        "#
    ))
    .bind(provider_name)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(result.rows_affected())
}
