use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::category::errors::CategoryError;
use crate::category::types::{Category, CategoryPermissions, NewCategory, PermissionType, Post};
use crate::userdb::SYSTEM_USER_ID;

use super::Tables;

pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
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
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                color TEXT NOT NULL,
                text_color TEXT NOT NULL,
                style_type TEXT NOT NULL,
                emoji TEXT,
                user_id BIGINT NOT NULL,
                topic_id BIGINT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {category_groups} (
                category_id BIGINT NOT NULL REFERENCES {categories}(id) ON DELETE CASCADE,
                group_name TEXT NOT NULL,
                permission_type INTEGER NOT NULL,
                PRIMARY KEY (category_id, group_name)
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {topics} (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                category_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {posts} (
                id BIGSERIAL PRIMARY KEY,
                topic_id BIGINT NOT NULL REFERENCES {topics}(id) ON DELETE CASCADE,
                post_number INTEGER NOT NULL,
                raw TEXT NOT NULL,
                user_id BIGINT NOT NULL,
                last_editor_id BIGINT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
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

pub(super) async fn get_category_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    id: i64,
) -> Result<Option<Category>, CategoryError> {
    sqlx::query_as::<_, Category>(&format!(
        r#"
        SELECT * FROM {} WHERE id = $1
        "#,
        tables.categories
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn list_categories_postgres(
    pool: &Pool<Postgres>,
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

pub(super) async fn name_taken_by_other_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    id: i64,
    name: &str,
) -> Result<bool, CategoryError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {} WHERE id <> $1 AND LOWER(name) = $2
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

pub(super) async fn insert_category_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    category: NewCategory,
) -> Result<Category, CategoryError> {
    let now = Utc::now();

    sqlx::query_as::<_, Category>(&format!(
        r#"
        INSERT INTO {}
            (name, slug, description, position, color, text_color, style_type, emoji,
             user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
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
    .fetch_one(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn rename_category_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    id: i64,
    name: &str,
    slug: &str,
) -> Result<(), CategoryError> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE {} SET name = $1, slug = $2, updated_at = $3 WHERE id = $4
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

pub(super) async fn get_permissions_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    category_id: i64,
) -> Result<CategoryPermissions, CategoryError> {
    let rows: Vec<(String, i32)> = sqlx::query_as(&format!(
        r#"
        SELECT group_name, permission_type FROM {} WHERE category_id = $1
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

pub(super) async fn replace_permissions_postgres(
    pool: &Pool<Postgres>,
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
        DELETE FROM {} WHERE category_id = $1
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
            INSERT INTO {} (category_id, group_name, permission_type) VALUES ($1, $2, $3)
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
        UPDATE {} SET updated_at = $1 WHERE id = $2
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

pub(super) async fn topic_exists_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    topic_id: i64,
) -> Result<bool, CategoryError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {} WHERE id = $1
        "#,
        tables.topics
    ))
    .bind(topic_id)
    .fetch_one(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(count > 0)
}

pub(super) async fn create_definition_postgres(
    pool: &Pool<Postgres>,
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

    let topic_id: i64 = sqlx::query_scalar(&format!(
        r#"
        INSERT INTO {} (title, category_id, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
        tables.topics
    ))
    .bind(title)
    .bind(category_id)
    .bind(SYSTEM_USER_ID)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    let post_id: i64 = sqlx::query_scalar(&format!(
        r#"
        INSERT INTO {}
            (topic_id, post_number, raw, user_id, last_editor_id, version, created_at, updated_at)
        VALUES ($1, 1, $2, $3, $4, 1, $5, $6)
        RETURNING id
        "#,
        tables.posts
    ))
    .bind(topic_id)
    .bind(description)
    .bind(SYSTEM_USER_ID)
    .bind(SYSTEM_USER_ID)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))?;

    let updated = sqlx::query(&format!(
        r#"
        UPDATE {} SET topic_id = $1, description = $2, updated_at = $3 WHERE id = $4
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
        SELECT * FROM {} WHERE id = $1
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

pub(super) async fn get_first_post_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    topic_id: i64,
) -> Result<Option<Post>, CategoryError> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT * FROM {} WHERE topic_id = $1 AND post_number = 1
        "#,
        tables.posts
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn revise_post_postgres(
    pool: &Pool<Postgres>,
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
        UPDATE {} SET raw = $1, last_editor_id = $2, version = version + 1, updated_at = $3
        WHERE id = $4
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
        UPDATE {} SET title = $1, updated_at = $2 WHERE id = $3
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
        SELECT * FROM {} WHERE id = $1
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

pub(super) async fn get_topic_title_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    topic_id: i64,
) -> Result<Option<String>, CategoryError> {
    sqlx::query_scalar(&format!(
        r#"
        SELECT title FROM {} WHERE id = $1
        "#,
        tables.topics
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn delete_topic_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    topic_id: i64,
) -> Result<(), CategoryError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!("DELETE FROM {} WHERE topic_id = $1", tables.posts))
        .bind(topic_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", tables.topics))
        .bind(topic_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))
}

pub(super) async fn delete_category_postgres(
    pool: &Pool<Postgres>,
    tables: &Tables,
    id: i64,
) -> Result<bool, CategoryError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", tables.categories))
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| CategoryError::Storage(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}
