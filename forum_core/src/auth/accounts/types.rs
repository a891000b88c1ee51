use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Link between a local user and one identity at an external provider
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct AssociatedAccount {
    pub id: i64,
    pub provider_name: String,
    pub provider_uid: String,
    pub user_id: i64,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Provider info captured at the last login
    pub info: Value,
    pub last_used: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssociatedAccount {
    pub provider_name: String,
    pub provider_uid: String,
    pub user_id: i64,
    pub email: Option<String>,
    pub name: Option<String>,
    pub info: Value,
}
