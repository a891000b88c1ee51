//! Site settings persisted as strings

mod errors;
mod postgres;
mod sqlite;
mod store_type;

pub use errors::SettingError;
pub use store_type::SiteSettingStore;
