use crate::category::{CategoryPermissions, EVERYONE_GROUP, PermissionType, STAFF_GROUP};

use super::text::SeedText;

pub const UNCATEGORIZED_CATEGORY_ID: &str = "uncategorized_category_id";
pub const META_CATEGORY_ID: &str = "meta_category_id";
pub const STAFF_CATEGORY_ID: &str = "staff_category_id";
pub const GENERAL_CATEGORY_ID: &str = "general_category_id";

/// `|`-separated ids of the categories shown in the default sidebar
pub const SIDEBAR_CATEGORIES_SETTING: &str = "default_navigation_menu_categories";

pub const DEFAULT_COMPOSER_CATEGORY_SETTING: &str = "default_composer_category";

/// How one well-known category should look
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDescriptor {
    /// Site setting holding the id of the seeded category
    pub site_setting_name: &'static str,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub color: &'static str,
    pub text_color: &'static str,
    pub style_type: &'static str,
    pub emoji: &'static str,
    pub permissions: &'static [(&'static str, PermissionType)],
    /// Reassert `permissions` on every run
    pub force_permissions: bool,
    /// Recreate the category if it was deleted
    pub force_existence: bool,
    pub sidebar: bool,
    pub default_composer_category: bool,
}

impl CategoryDescriptor {
    pub fn category_permissions(&self) -> CategoryPermissions {
        self.permissions
            .iter()
            .map(|(group, permission)| (group.to_string(), *permission))
            .collect()
    }

    /// The description, when there is one worth a topic
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

const EVERYONE_FULL: &[(&str, PermissionType)] = &[(EVERYONE_GROUP, PermissionType::Full)];
const STAFF_FULL: &[(&str, PermissionType)] = &[(STAFF_GROUP, PermissionType::Full)];

/// The default categories in position order
pub fn default_categories(text: &SeedText) -> Vec<CategoryDescriptor> {
    vec![
        CategoryDescriptor {
            site_setting_name: UNCATEGORIZED_CATEGORY_ID,
            name: text.uncategorized_name.clone(),
            description: None,
            position: 0,
            color: "0088CC",
            text_color: "FFFFFF",
            style_type: "emoji",
            emoji: "card_file_box",
            permissions: EVERYONE_FULL,
            force_permissions: true,
            force_existence: true,
            sidebar: false,
            default_composer_category: false,
        },
        CategoryDescriptor {
            site_setting_name: META_CATEGORY_ID,
            name: text.meta_name.clone(),
            description: Some(text.meta_description.clone()),
            position: 1,
            color: "808281",
            text_color: "FFFFFF",
            style_type: "emoji",
            emoji: "thought_balloon",
            permissions: EVERYONE_FULL,
            force_permissions: true,
            force_existence: false,
            sidebar: true,
            default_composer_category: false,
        },
        CategoryDescriptor {
            site_setting_name: STAFF_CATEGORY_ID,
            name: text.staff_name.clone(),
            description: Some(text.staff_description.clone()),
            position: 2,
            color: "E45735",
            text_color: "FFFFFF",
            style_type: "emoji",
            emoji: "shield",
            permissions: STAFF_FULL,
            force_permissions: true,
            force_existence: false,
            sidebar: true,
            default_composer_category: false,
        },
        CategoryDescriptor {
            site_setting_name: GENERAL_CATEGORY_ID,
            name: text.general_name.clone(),
            description: Some(text.general_description.clone()),
            position: 3,
            color: "25AAE2",
            text_color: "FFFFFF",
            style_type: "emoji",
            emoji: "blue_book",
            permissions: EVERYONE_FULL,
            force_permissions: false,
            force_existence: false,
            sidebar: true,
            default_composer_category: true,
        },
    ]
}
