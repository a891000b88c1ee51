use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::errors::SettingError;

pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
) -> Result<(), SettingError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            name TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| SettingError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_setting_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    name: &str,
) -> Result<Option<String>, SettingError> {
    sqlx::query_scalar(&format!(
        r#"
        SELECT value FROM {table_name} WHERE name = $1
        "#
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| SettingError::Storage(e.to_string()))
}

pub(super) async fn set_setting_postgres(
    pool: &Pool<Postgres>,
    table_name: &str,
    name: &str,
    value: &str,
) -> Result<(), SettingError> {
    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (name, value, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET
            value = EXCLUDED.value,
            updated_at = EXCLUDED.updated_at
        "#
    ))
    .bind(name)
    .bind(value)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| SettingError::Storage(e.to_string()))?;

    Ok(())
}
