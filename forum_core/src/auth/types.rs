use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::userdb::User;

/// Identity details reported by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Provider-specific payload attached to a token
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthExtra {
    /// Raw claims as the provider returned them
    #[serde(default)]
    pub raw_info: Value,
}

/// Normalized token handed over by the OAuth callback
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthToken {
    #[serde(default)]
    pub provider: String,
    /// Provider-scoped stable identifier
    pub uid: String,
    #[serde(default)]
    pub info: AuthInfo,
    #[serde(default)]
    pub extra: AuthExtra,
}

impl AuthToken {
    /// `email_verified` claim from the raw provider info, if present
    pub fn email_verified(&self) -> Option<bool> {
        self.extra.raw_info.get("email_verified").and_then(|v| match v {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }
}

/// A directory group the authenticated user belongs to
///
/// Field names follow the Directory API group resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    pub direct_members_count: Option<i64>,
    #[serde(default)]
    pub admin_created: bool,
}

// The Directory API reports int64 fields as JSON strings
fn count_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64()),
        Some(Value::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "unexpected member count: {other}"
        ))),
    }
}

/// Outcome of a single authentication attempt
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AuthResult {
    pub user: Option<User>,
    pub email: Option<String>,
    /// The provider vouches for the email address
    pub email_valid: bool,
    pub skip_email_validation: bool,
    pub name: Option<String>,
    pub username: Option<String>,
    pub extra_data: Map<String, Value>,
    /// `None` when the provider does not report groups or the lookup failed
    pub associated_groups: Option<Vec<DirectoryGroup>>,
    pub failed: bool,
    pub failed_reason: Option<String>,
}

impl AuthResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            failed: true,
            failed_reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// Result of revoking a provider connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    /// Local state was cleared but the provider could not be reached
    RemoteFailed,
}
