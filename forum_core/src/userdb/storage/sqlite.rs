use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::userdb::errors::{UserError, insert_error};
use crate::userdb::types::{NewUser, SYSTEM_USER_ID, SYSTEM_USERNAME, User};

pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), UserError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            name TEXT,
            email TEXT NOT NULL,
            active BOOLEAN NOT NULL DEFAULT false,
            approved BOOLEAN NOT NULL DEFAULT false,
            trust_level INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_{table_name}_username_lower
        ON {table_name} (LOWER(username))
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_{table_name}_email_lower
        ON {table_name} (LOWER(email))
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn ensure_system_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<(), UserError> {
    let now = Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (id, username, name, email, active, approved, trust_level, created_at, updated_at)
        VALUES (?, ?, ?, ?, true, true, 4, ?, ?)
        ON CONFLICT (id) DO NOTHING
        "#
    ))
    .bind(SYSTEM_USER_ID)
    .bind(SYSTEM_USERNAME)
    .bind("system")
    .bind("no_email@system.invalid")
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_user_by_id_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    id: i64,
) -> Result<Option<User>, UserError> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_user_by_email_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    email: &str,
) -> Result<Option<User>, UserError> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE LOWER(email) = ?
        "#
    ))
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn username_exists_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    username: &str,
) -> Result<bool, UserError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE LOWER(username) = ?
        "#
    ))
    .bind(username.to_lowercase())
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(count > 0)
}

pub(super) async fn count_human_users_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
) -> Result<i64, UserError> {
    sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE id > 0
        "#
    ))
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    table_name: &str,
    user: NewUser,
) -> Result<User, UserError> {
    let now = Utc::now();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (username, name, email, active, approved, trust_level, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#
    ))
    .bind(&user.username)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.active)
    .bind(user.approved)
    .bind(user.trust_level)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(insert_error)?;

    let id = result.last_insert_rowid();
    get_user_by_id_sqlite(pool, table_name, id)
        .await?
        .ok_or(UserError::NotFound(id))
}
