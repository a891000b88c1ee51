mod errors;
mod postgres;
mod sqlite;
mod store_type;
mod types;

pub use errors::AccountError;
pub use store_type::AccountStore;
pub use types::{AssociatedAccount, NewAssociatedAccount};
