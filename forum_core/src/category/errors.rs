use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
