use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum SettingError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid setting name: {0}")]
    InvalidName(String),
}
