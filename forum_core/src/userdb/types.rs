use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Id of the built-in system account that authors seeded content
pub const SYSTEM_USER_ID: i64 = -1;

/// Username reserved for the system account
pub const SYSTEM_USERNAME: &str = "system";

/// A local forum account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Database-assigned id; the system account and bots use ids <= 0
    pub id: i64,
    pub username: String,
    /// Display name
    pub name: Option<String>,
    pub email: String,
    pub active: bool,
    pub approved: bool,
    pub trust_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account belongs to a person rather than the system or a bot
    pub fn is_human(&self) -> bool {
        self.id > 0
    }
}

/// Fields required to insert a new [`User`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub active: bool,
    pub approved: bool,
    pub trust_level: i32,
}
