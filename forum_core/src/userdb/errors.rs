use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i64),

    /// Username or email already taken, ignoring case
    #[error("User already exists: {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid user data: {0}")]
    InvalidData(String),
}

/// Classify a failed insert, separating unique-index conflicts from other errors
pub(crate) fn insert_error(err: sqlx::Error) -> UserError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => UserError::Duplicate(db.message().to_string()),
        _ => UserError::Storage(err.to_string()),
    }
}
