mod postgres;
mod sqlite;
mod store_type;

pub use store_type::CategoryStore;

/// Prefixed names of the tables backing categories
#[derive(Debug, Clone)]
pub(super) struct Tables {
    pub(super) categories: String,
    pub(super) category_groups: String,
    pub(super) topics: String,
    pub(super) posts: String,
}
