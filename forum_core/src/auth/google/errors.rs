use thiserror::Error;

/// Failures while enumerating Workspace groups
///
/// These never reach the login flow; they are logged and the groups are
/// treated as unknown.
#[derive(Debug, Error, Clone)]
pub enum GroupsError {
    #[error("Invalid service account credentials: {0}")]
    ServiceAccount(String),

    #[error("Failed to sign assertion: {0}")]
    Signing(String),

    #[error("Token exchange failed - status {status}")]
    TokenExchange { status: u16, body: String },

    #[error("Group page request failed - status {status}")]
    Page { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for GroupsError {
    fn from(err: serde_json::Error) -> Self {
        GroupsError::InvalidResponse(err.to_string())
    }
}
