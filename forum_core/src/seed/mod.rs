//! First-boot seeding of the default categories

mod categories;
mod descriptors;
mod errors;
mod text;

pub use categories::{CategorySeeder, ReseedOption};
pub use descriptors::{
    CategoryDescriptor, DEFAULT_COMPOSER_CATEGORY_SETTING, GENERAL_CATEGORY_ID, META_CATEGORY_ID,
    SIDEBAR_CATEGORIES_SETTING, STAFF_CATEGORY_ID, UNCATEGORIZED_CATEGORY_ID, default_categories,
};
pub use errors::SeedError;
pub use text::SeedText;
