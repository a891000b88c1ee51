use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::errors::AccountError;
use super::types::{AssociatedAccount, NewAssociatedAccount};

pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
) -> Result<(), AccountError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            provider_name TEXT NOT NULL,
            provider_uid TEXT NOT NULL,
            user_id BIGINT NOT NULL,
            email TEXT,
            name TEXT,
            info JSONB NOT NULL,
            last_used TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
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

pub(super) async fn get_account_by_provider_uid_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    provider_name: &str,
    provider_uid: &str,
) -> Result<Option<AssociatedAccount>, AccountError> {
    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        SELECT * FROM {table_name}
        WHERE provider_name = $1 AND provider_uid = $2
        "#
    ))
    .bind(provider_name)
    .bind(provider_uid)
    .fetch_optional(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn get_account_for_user_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    provider_name: &str,
    user_id: i64,
) -> Result<Option<AssociatedAccount>, AccountError> {
    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        SELECT * FROM {table_name}
        WHERE provider_name = $1 AND user_id = $2
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

pub(super) async fn upsert_account_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    account: NewAssociatedAccount,
) -> Result<AssociatedAccount, AccountError> {
    let now = Utc::now();

    sqlx::query_as::<_, AssociatedAccount>(&format!(
        r#"
        INSERT INTO {table_name}
            (provider_name, provider_uid, user_id, email, name, info, last_used, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $7)
        ON CONFLICT (provider_name, provider_uid) DO UPDATE SET
            user_id = EXCLUDED.user_id,
            email = EXCLUDED.email,
            name = EXCLUDED.name,
            info = EXCLUDED.info,
            last_used = EXCLUDED.last_used,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#
    ))
    .bind(&account.provider_name)
    .bind(&account.provider_uid)
    .bind(account.user_id)
    .bind(&account.email)
    .bind(&account.name)
    .bind(&account.info)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))
}

pub(super) async fn delete_accounts_for_user_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    provider_name: &str,
    user_id: i64,
) -> Result<u64, AccountError> {
    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE provider_name = $1 AND user_id = $2
        "#
    ))
    .bind(provider_name)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| AccountError::Storage(e.to_string()))?;

    Ok(result.rows_affected())
}
