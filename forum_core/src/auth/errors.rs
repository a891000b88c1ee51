use thiserror::Error;

use crate::userdb::UserError;

use super::accounts::AccountError;

/// Errors surfaced by authenticators and the middleware registry
#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("Invalid auth token: {0}")]
    InvalidToken(String),

    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider misconfigured: {0}")]
    Misconfigured(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("User error: {0}")]
    User(UserError),

    #[error("Account error: {0}")]
    Account(AccountError),
}

// Conversions from storage errors log at the point they cross into the auth layer

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        let error = Self::User(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<AccountError> for AuthError {
    fn from(err: AccountError) -> Self {
        let error = Self::Account(err);
        tracing::error!("{}", error);
        error
    }
}
