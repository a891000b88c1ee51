use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum AccountError {
    #[error("Associated account not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for AccountError {
    fn from(err: serde_json::Error) -> Self {
        AccountError::InvalidData(err.to_string())
    }
}
