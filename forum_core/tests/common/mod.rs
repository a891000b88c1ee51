pub mod mock_google;
pub mod test_setup;

pub use mock_google::{MockGoogle, MockGoogleConfig};
pub use test_setup::{TestStores, service_account_json};
