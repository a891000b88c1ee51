use thiserror::Error;

use crate::category::CategoryError;
use crate::settings::SettingError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors raised while seeding default content
#[derive(Debug, Error, Clone)]
pub enum SeedError {
    #[error("Category error: {0}")]
    Category(CategoryError),

    #[error("Setting error: {0}")]
    Setting(SettingError),

    #[error("User error: {0}")]
    User(UserError),

    #[error("Utility error: {0}")]
    Util(UtilError),
}

impl From<CategoryError> for SeedError {
    fn from(err: CategoryError) -> Self {
        let error = Self::Category(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SettingError> for SeedError {
    fn from(err: SettingError) -> Self {
        let error = Self::Setting(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UserError> for SeedError {
    fn from(err: UserError) -> Self {
        let error = Self::User(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for SeedError {
    fn from(err: UtilError) -> Self {
        let error = Self::Util(err);
        tracing::error!("{}", error);
        error
    }
}
