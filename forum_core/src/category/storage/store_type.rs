use std::sync::Arc;

use crate::storage::{DataStore, UNSUPPORTED_STORE};
use crate::category::errors::CategoryError;
use crate::category::types::{Category, CategoryPermissions, NewCategory, Post};

use super::Tables;
use super::postgres::*;
use super::sqlite::*;

/// Categories with their group permissions and description topics
#[derive(Clone)]
pub struct CategoryStore {
    store: Arc<dyn DataStore>,
}

impl CategoryStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn tables(&self) -> Tables {
        Tables {
            categories: self.store.table("categories"),
            category_groups: self.store.table("category_groups"),
            topics: self.store.table("topics"),
            posts: self.store.table("posts"),
        }
    }

    pub async fn init(&self) -> Result<(), CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            create_tables_sqlite(pool, &tables).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_tables_postgres(pool, &tables).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    pub async fn find(&self, id: i64) -> Result<Option<Category>, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            get_category_sqlite(pool, &tables, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_category_postgres(pool, &tables, id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    pub async fn exists(&self, id: i64) -> Result<bool, CategoryError> {
        Ok(self.find(id).await?.is_some())
    }

    /// Categories ordered by position
    pub async fn list(&self) -> Result<Vec<Category>, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            list_categories_sqlite(pool, &tables).await
        } else if let Some(pool) = self.store.as_postgres() {
            list_categories_postgres(pool, &tables).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Whether a category other than `id` already uses `name`, ignoring case
    pub async fn name_taken_by_other(&self, id: i64, name: &str) -> Result<bool, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            name_taken_by_other_sqlite(pool, &tables, id, name).await
        } else if let Some(pool) = self.store.as_postgres() {
            name_taken_by_other_postgres(pool, &tables, id, name).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    #[tracing::instrument(skip(self, category), fields(name = %category.name))]
    pub async fn insert(&self, category: NewCategory) -> Result<Category, CategoryError> {
        if category.name.trim().is_empty() {
            return Err(CategoryError::InvalidData(
                "Category name cannot be empty".to_string(),
            ));
        }

        let tables = self.tables();

        let result = if let Some(pool) = self.store.as_sqlite() {
            insert_category_sqlite(pool, &tables, category).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_category_postgres(pool, &tables, category).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        };

        match &result {
            Ok(created) => tracing::info!(category_id = created.id, "Category created"),
            Err(e) => tracing::error!(error = %e, "Category creation failed"),
        }

        result
    }

    #[tracing::instrument(skip(self))]
    pub async fn rename(&self, id: i64, name: &str, slug: &str) -> Result<(), CategoryError> {
        if name.trim().is_empty() {
            return Err(CategoryError::InvalidData(
                "Category name cannot be empty".to_string(),
            ));
        }

        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            rename_category_sqlite(pool, &tables, id, name, slug).await
        } else if let Some(pool) = self.store.as_postgres() {
            rename_category_postgres(pool, &tables, id, name, slug).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    pub async fn permissions(&self, id: i64) -> Result<CategoryPermissions, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            get_permissions_sqlite(pool, &tables, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_permissions_postgres(pool, &tables, id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Replace the group permissions of `id`; returns whether anything changed
    #[tracing::instrument(skip(self, permissions))]
    pub async fn set_permissions(
        &self,
        id: i64,
        permissions: &CategoryPermissions,
    ) -> Result<bool, CategoryError> {
        if &self.permissions(id).await? == permissions {
            return Ok(false);
        }

        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            replace_permissions_sqlite(pool, &tables, id, permissions).await?;
        } else if let Some(pool) = self.store.as_postgres() {
            replace_permissions_postgres(pool, &tables, id, permissions).await?;
        } else {
            return Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()));
        }

        tracing::info!(category_id = id, groups = permissions.len(), "Category permissions set");
        Ok(true)
    }

    /// Create the description topic of `id` with `description` as its first post
    ///
    /// The topic and post are authored by the system account.
    #[tracing::instrument(skip(self, description))]
    pub async fn create_definition(
        &self,
        id: i64,
        title: &str,
        description: &str,
    ) -> Result<Post, CategoryError> {
        let tables = self.tables();

        let post = if let Some(pool) = self.store.as_sqlite() {
            create_definition_sqlite(pool, &tables, id, title, description).await?
        } else if let Some(pool) = self.store.as_postgres() {
            create_definition_postgres(pool, &tables, id, title, description).await?
        } else {
            return Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()));
        };

        tracing::info!(category_id = id, topic_id = post.topic_id, "Category definition created");
        Ok(post)
    }

    pub async fn topic_exists(&self, topic_id: i64) -> Result<bool, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            topic_exists_sqlite(pool, &tables, topic_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            topic_exists_postgres(pool, &tables, topic_id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    pub async fn topic_title(&self, topic_id: i64) -> Result<Option<String>, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            get_topic_title_sqlite(pool, &tables, topic_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_topic_title_postgres(pool, &tables, topic_id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// The description post of `category`, if its topic still exists
    pub async fn first_post(&self, category: &Category) -> Result<Option<Post>, CategoryError> {
        let Some(topic_id) = category.topic_id else {
            return Ok(None);
        };
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            get_first_post_sqlite(pool, &tables, topic_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_first_post_postgres(pool, &tables, topic_id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Edit `post` as `editor_id`, retitling its topic
    ///
    /// Skips content validation and bumps the post version.
    #[tracing::instrument(skip(self, post, raw), fields(post_id = post.id))]
    pub async fn revise_post(
        &self,
        post: &Post,
        editor_id: i64,
        title: &str,
        raw: &str,
    ) -> Result<Post, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            revise_post_sqlite(pool, &tables, post, editor_id, title, raw).await
        } else if let Some(pool) = self.store.as_postgres() {
            revise_post_postgres(pool, &tables, post, editor_id, title, raw).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Remove a topic together with its posts
    pub async fn delete_topic(&self, topic_id: i64) -> Result<(), CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            delete_topic_sqlite(pool, &tables, topic_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_topic_postgres(pool, &tables, topic_id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }

    /// Delete a category; returns whether it existed
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool, CategoryError> {
        let tables = self.tables();

        if let Some(pool) = self.store.as_sqlite() {
            delete_category_sqlite(pool, &tables, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_category_postgres(pool, &tables, id).await
        } else {
            Err(CategoryError::Storage(UNSUPPORTED_STORE.to_string()))
        }
    }
}
