//! Content categories and their description topics

mod errors;
mod storage;
mod types;

pub use errors::CategoryError;
pub use storage::CategoryStore;
pub use types::{
    Category, CategoryPermissions, EVERYONE_GROUP, NewCategory, PermissionType, Post, STAFF_GROUP,
};
