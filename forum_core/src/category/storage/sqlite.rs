use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::category::errors::CategoryError;
use crate::category::types::{Category, CategoryPermissions, NewCategory, PermissionType, Post};
use crate::userdb::SYSTEM_USER_ID;

use super::Tables;

pub(super) async fn create_tables_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
) -> Result<(), CategoryError> {
    let Tables {
        categories,
        category_groups,
        topics,
        posts,
    } = tables;

    let statements = [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {categories} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                color TEXT NOT NULL,
                text_color TEXT NOT NULL,
                style_type TEXT NOT NULL,
                emoji TEXT,
                user_id INTEGER NOT NULL,
                topic_id INTEGER,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {category_groups} (
                category_id INTEGER NOT NULL REFERENCES {categories}(id) ON DELETE CASCADE,
                group_name TEXT NOT NULL,
                permission_type INTEGER NOT NULL,
                PRIMARY KEY (category_id, group_name)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {topics} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {posts} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic_id INTEGER NOT NULL REFERENCES {topics}(id) ON DELETE CASCADE,
                post_number INTEGER NOT NULL,
                raw TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                last_editor_id INTEGER NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                UNIQUE(topic_id, post_number)
            )
            "#
        ),
    ];

    for statement in statements {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(|e| CategoryError::Storage(e.to_string()))?;
    }

    Ok(())
}

pub(super) async fn get_category_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    id: i64,
) -> Result<Option<Category>, CategoryError> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT * FROM {} WHERE id = ?
        "#,
        tables.categories
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn list_categories_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
) -> Result<Vec<Category>, CategoryError> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT * FROM {} ORDER BY position, id
        "#,
        tables.categories
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn name_taken_by_other_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    id: i64,
    name: &str,
) -> Result<bool, CategoryError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {} WHERE id <> ? AND LOWER(name) = ?
        "#,
        tables.categories
    ))
    .bind(id)
    .bind(name.to_lowercase())
    .fetch_one(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(count > 0)
}

pub(super) async fn insert_category_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    category: NewCategory,
) -> Result<Category, CategoryError> {
    let now = Utc::now();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {}
            (name, slug, description, position, color, text_color, style_type, emoji,
             user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        tables.categories
    ))
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(category.position)
    .bind(&category.color)
    .bind(&category.text_color)
    .bind(&category.style_type)
    .bind(&category.emoji)
    .bind(category.user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    let id = result.last_insert_rowid();
    get_category_sqlite(pool, tables, id)
        .await?
        .ok_or(CategoryError::NotFound(id))
}

pub(super) async fn rename_category_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    id: i64,
    name: &str,
    slug: &str,
) -> Result<(), CategoryError> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET name = ?, slug = ?, updated_at = ? WHERE id = ?
        "#,
        tables.categories
    ))
    .bind(name)
    .bind(slug)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(CategoryError::NotFound(id));
    }
    Ok(())
}

pub(super) async fn get_permissions_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    category_id: i64,
) -> Result<CategoryPermissions, CategoryError> {
    let rows: Vec<(String, i32)> = sqlx::query_as(&format!(
        r#"
        SELECT group_name, permission_type FROM {} WHERE category_id = ?
        "#,
        tables.category_groups
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    rows.into_iter()
        .map(|(group, value)| {
            PermissionType::from_i32(value)
                .map(|permission| (group, permission))
                .ok_or_else(|| {
                    CategoryError::InvalidData(format!("Unknown permission type: {value}"))
                })
        })
        .collect()
}

pub(super) async fn replace_permissions_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    category_id: i64,
    permissions: &CategoryPermissions,
) -> Result<(), CategoryError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        DELETE FROM {} WHERE category_id = ?
        "#,
        tables.category_groups
    ))
    .bind(category_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    for (group, permission) in permissions {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (category_id, group_name, permission_type) VALUES (?, ?, ?)
            "#,
            tables.category_groups
        ))
        .bind(category_id)
        .bind(group)
        .bind(permission.as_i32())
        .execute(&mut *tx)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;
    }

    sqlx::query(&format!(
        r#"
        UPDATE {} SET updated_at = ? WHERE id = ?
        "#,
        tables.categories
    ))
    .bind(Utc::now())
    .bind(category_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn topic_exists_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    topic_id: i64,
) -> Result<bool, CategoryError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {} WHERE id = ?
        "#,
        tables.topics
    ))
    .bind(topic_id)
    .fetch_one(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(count > 0)
}

pub(super) async fn create_definition_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    category_id: i64,
    title: &str,
    description: &str,
) -> Result<Post, CategoryError> {
    let now = Utc::now();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    let topic = sqlx::query(&format!(
        r#"
        INSERT INTO {} (title, category_id, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
        tables.topics
    ))
    .bind(title)
    .bind(category_id)
    .bind(SYSTEM_USER_ID)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;
    let topic_id = topic.last_insert_rowid();

    let post = sqlx::query(&format!(
        r#"
        INSERT INTO {}
            (topic_id, post_number, raw, user_id, last_editor_id, version, created_at, updated_at)
        VALUES (?, 1, ?, ?, ?, 1, ?, ?)
        "#,
        tables.posts
    ))
    .bind(topic_id)
    .bind(description)
    .bind(SYSTEM_USER_ID)
    .bind(SYSTEM_USER_ID)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;
    let post_id = post.last_insert_rowid();

    let updated = sqlx::query(&format!(
        r#"
        UPDATE {} SET topic_id = ?, description = ?, updated_at = ? WHERE id = ?
        "#,
        tables.categories
    ))
    .bind(topic_id)
    .bind(description)
    .bind(now)
    .bind(category_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    if updated.rows_affected() == 0 {
        return Err(CategoryError::NotFound(category_id));
    }

    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT * FROM {} WHERE id = ?
        "#,
        tables.posts
    ))
    .bind(post_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(post)
}

pub(super) async fn get_first_post_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    topic_id: i64,
) -> Result<Option<Post>, CategoryError> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT * FROM {} WHERE topic_id = ? AND post_number = 1
        "#,
        tables.posts
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn revise_post_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    post: &Post,
    editor_id: i64,
    title: &str,
    raw: &str,
) -> Result<Post, CategoryError> {
    let now = Utc::now();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        UPDATE {} SET raw = ?, last_editor_id = ?, version = version + 1, updated_at = ?
        WHERE id = ?
        "#,
        tables.posts
    ))
    .bind(raw)
    .bind(editor_id)
    .bind(now)
    .bind(post.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        UPDATE {} SET title = ?, updated_at = ? WHERE id = ?
        "#,
        tables.topics
    ))
    .bind(title)
    .bind(now)
    .bind(post.topic_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    let revised = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT * FROM {} WHERE id = ?
        "#,
        tables.posts
    ))
    .bind(post.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(revised)
}

pub(super) async fn get_topic_title_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    topic_id: i64,
) -> Result<Option<String>, CategoryError> {
    sqlx::query_scalar(&format!(
        r#"
        SELECT title FROM {} WHERE id = ?
        "#,
        tables.topics
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn delete_topic_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    topic_id: i64,
) -> Result<(), CategoryError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!("DELETE FROM {} WHERE topic_id = ?", tables.posts))
        .bind(topic_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!("DELETE FROM {} WHERE id = ?", tables.topics))
        .bind(topic_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn delete_category_sqlite(
    pool: &Pool<Sqlite>,
    tables: &Tables,
    id: i64,
) -> Result<bool, CategoryError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", tables.categories))
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}
