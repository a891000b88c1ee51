//! Idempotent creation and reconciliation of the default categories
//!
//! Each default category is bound to a site setting holding its id. `create`
//! only ever adds categories before the first person signs up, `update`
//! converges names and description posts, and `reseed_options` reports which
//! categories are still untouched by people.

use serde::Serialize;

use crate::category::{Category, CategoryStore, NewCategory};
use crate::settings::SiteSettingStore;
use crate::userdb::{SYSTEM_USER_ID, UserStore};
use crate::utils::{gen_random_hex, slug_for};

use super::descriptors::{
    CategoryDescriptor, DEFAULT_COMPOSER_CATEGORY_SETTING, SIDEBAR_CATEGORIES_SETTING,
    default_categories,
};
use super::errors::SeedError;
use super::text::SeedText;

/// Bytes of randomness appended to a colliding name (hex encoded)
const NAME_SUFFIX_BYTES: usize = 16;

/// A seeded category an operator may choose to reseed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReseedOption {
    /// Site setting name of the category
    pub id: String,
    pub name: String,
    /// Nobody but the system account has edited the description
    pub selected: bool,
}

pub struct CategorySeeder {
    text: SeedText,
    users: UserStore,
    categories: CategoryStore,
    settings: SiteSettingStore,
}

impl CategorySeeder {
    pub fn new(
        text: SeedText,
        users: UserStore,
        categories: CategoryStore,
        settings: SiteSettingStore,
    ) -> Self {
        Self {
            text,
            users,
            categories,
            settings,
        }
    }

    fn descriptors(&self, site_setting_names: Option<&[&str]>) -> Vec<CategoryDescriptor> {
        let mut descriptors = default_categories(&self.text);
        if let Some(names) = site_setting_names {
            descriptors.retain(|d| names.contains(&d.site_setting_name));
        }
        descriptors
    }

    /// Create missing default categories and repair existing ones
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, site_setting_names: Option<&[&str]>) -> Result<(), SeedError> {
        for descriptor in self.descriptors(site_setting_names) {
            self.create_category(&descriptor).await?;
        }
        Ok(())
    }

    /// Rename default categories and rewrite their descriptions
    ///
    /// With `skip_changed`, categories whose description a person has edited
    /// are left alone.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        site_setting_names: Option<&[&str]>,
        skip_changed: bool,
    ) -> Result<(), SeedError> {
        for descriptor in self.descriptors(site_setting_names) {
            self.update_category(&descriptor, skip_changed).await?;
        }
        Ok(())
    }

    /// Seeded categories that still exist, with whether they are safe to reseed
    pub async fn reseed_options(&self) -> Result<Vec<ReseedOption>, SeedError> {
        let mut options = Vec::new();

        for descriptor in self.descriptors(None) {
            let Some(category) = self.find_category(descriptor.site_setting_name).await? else {
                continue;
            };

            options.push(ReseedOption {
                id: descriptor.site_setting_name.to_string(),
                selected: self.unchanged(&category).await?,
                name: category.name,
            });
        }

        Ok(options)
    }

    async fn create_category(&self, descriptor: &CategoryDescriptor) -> Result<(), SeedError> {
        let setting = descriptor.site_setting_name;
        let category_id = self.settings.get_i64(setting).await?;

        if self
            .should_create_category(category_id, descriptor.force_existence)
            .await?
        {
            let name = self.unused_category_name(category_id, &descriptor.name).await?;

            let category = self
                .categories
                .insert(NewCategory {
                    slug: slug_for(&name),
                    name,
                    description: descriptor.description.clone(),
                    position: descriptor.position,
                    color: descriptor.color.to_string(),
                    text_color: descriptor.text_color.to_string(),
                    style_type: descriptor.style_type.to_string(),
                    emoji: Some(descriptor.emoji.to_string()),
                    user_id: SYSTEM_USER_ID,
                })
                .await?;

            if let Some(description) = descriptor.description_text() {
                self.categories
                    .create_definition(category.id, &self.text.topic_title(&category.name), description)
                    .await?;
            }
            self.categories
                .set_permissions(category.id, &descriptor.category_permissions())
                .await?;

            self.settings.set(setting, &category.id.to_string()).await?;

            if descriptor.sidebar {
                self.add_to_sidebar(category.id).await?;
            }
            if descriptor.default_composer_category {
                self.settings
                    .set(DEFAULT_COMPOSER_CATEGORY_SETTING, &category.id.to_string())
                    .await?;
            }

            tracing::info!(
                setting,
                category_id = category.id,
                name = %category.name,
                "Seeded category"
            );
            return Ok(());
        }

        if category_id <= 0 {
            return Ok(());
        }
        let Some(category) = self.categories.find(category_id).await? else {
            tracing::debug!(setting, category_id, "Seeded category is gone, not recreating");
            return Ok(());
        };

        if let Some(description) = descriptor.description_text() {
            let has_topic = match category.topic_id {
                Some(topic_id) => self.categories.topic_exists(topic_id).await?,
                None => false,
            };
            if !has_topic {
                self.categories
                    .create_definition(category.id, &self.text.topic_title(&category.name), description)
                    .await?;
            }
        }

        if descriptor.force_permissions {
            let changed = self
                .categories
                .set_permissions(category.id, &descriptor.category_permissions())
                .await?;
            if changed {
                tracing::info!(setting, category_id, "Restored seeded category permissions");
            }
        }

        Ok(())
    }

    async fn update_category(
        &self,
        descriptor: &CategoryDescriptor,
        skip_changed: bool,
    ) -> Result<(), SeedError> {
        let Some(category) = self.find_category(descriptor.site_setting_name).await? else {
            return Ok(());
        };
        if skip_changed && !self.unchanged(&category).await? {
            tracing::debug!(
                category_id = category.id,
                "Skipping category edited by a person"
            );
            return Ok(());
        }

        let name = self.unused_category_name(category.id, &descriptor.name).await?;
        self.categories
            .rename(category.id, &name, &slug_for(&name))
            .await?;

        if let Some(description) = descriptor.description_text() {
            if let Some(post) = self.categories.first_post(&category).await? {
                self.categories
                    .revise_post(&post, SYSTEM_USER_ID, &self.text.topic_title(&name), description)
                    .await?;
            }
        }

        tracing::info!(category_id = category.id, name = %name, "Updated seeded category");
        Ok(())
    }

    async fn should_create_category(
        &self,
        category_id: i64,
        force_existence: bool,
    ) -> Result<bool, SeedError> {
        if self.users.human_users_exist().await? {
            return Ok(false);
        }

        if category_id > 0 {
            if force_existence {
                Ok(!self.categories.exists(category_id).await?)
            } else {
                Ok(false)
            }
        } else {
            Ok(true)
        }
    }

    /// `name`, or `name` with a random suffix when another category uses it
    async fn unused_category_name(&self, category_id: i64, name: &str) -> Result<String, SeedError> {
        if self.categories.name_taken_by_other(category_id, name).await? {
            Ok(format!("{name}{}", gen_random_hex(NAME_SUFFIX_BYTES)?))
        } else {
            Ok(name.to_string())
        }
    }

    async fn find_category(&self, site_setting_name: &str) -> Result<Option<Category>, SeedError> {
        let category_id = self.settings.get_i64(site_setting_name).await?;
        if category_id <= 0 {
            return Ok(None);
        }
        Ok(self.categories.find(category_id).await?)
    }

    /// Whether only the system account has edited the description post
    async fn unchanged(&self, category: &Category) -> Result<bool, SeedError> {
        match self.categories.first_post(category).await? {
            Some(post) => Ok(post.last_editor_id == SYSTEM_USER_ID),
            None => Ok(true),
        }
    }

    async fn add_to_sidebar(&self, category_id: i64) -> Result<(), SeedError> {
        let current = self
            .settings
            .get_string(SIDEBAR_CATEGORIES_SETTING)
            .await?
            .unwrap_or_default();

        let mut ids: Vec<String> = current
            .split('|')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        ids.push(category_id.to_string());

        self.settings
            .set(SIDEBAR_CATEGORIES_SETTING, &ids.join("|"))
            .await?;
        Ok(())
    }
}
