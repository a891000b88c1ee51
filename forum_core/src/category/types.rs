use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name of the group every user belongs to
pub const EVERYONE_GROUP: &str = "everyone";

/// Name of the group of moderators and admins
pub const STAFF_GROUP: &str = "staff";

/// A content category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    /// Hex colour without the leading `#`
    pub color: String,
    pub text_color: String,
    pub style_type: String,
    pub emoji: Option<String>,
    pub user_id: i64,
    /// Topic holding the "About this category" post
    pub topic_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub color: String,
    pub text_color: String,
    pub style_type: String,
    pub emoji: Option<String>,
    pub user_id: i64,
}

/// Access a group has to a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum PermissionType {
    Full = 1,
    CreatePost = 2,
    ReadOnly = 3,
}

impl PermissionType {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Full),
            2 => Some(Self::CreatePost),
            3 => Some(Self::ReadOnly),
            _ => None,
        }
    }
}

/// Group name to permission
pub type CategoryPermissions = BTreeMap<String, PermissionType>;

/// A post; the first post of a category's topic is its description
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Post {
    pub id: i64,
    pub topic_id: i64,
    pub post_number: i32,
    pub raw: String,
    pub user_id: i64,
    pub last_editor_id: i64,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_type_round_trips_through_i32() {
        for permission in [
            PermissionType::Full,
            PermissionType::CreatePost,
            PermissionType::ReadOnly,
        ] {
            assert_eq!(PermissionType::from_i32(permission.as_i32()), Some(permission));
        }
        assert_eq!(PermissionType::from_i32(0), None);
    }
}
