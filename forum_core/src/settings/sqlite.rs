use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::errors::SettingError;

pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), SettingError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            name TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| SettingError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_setting_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    name: &str,
) -> Result<Option<String>, SettingError> {
    sqlx::query_scalar(&format!(
        r#"
        SELECT value FROM {table_name} WHERE name = ?
        "#
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| SettingError::Storage(e.to_string()))
}

pub(super) async fn set_setting_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    name: &str,
    value: &str,
) -> Result<(), SettingError> {
    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (name, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT (name) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
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
