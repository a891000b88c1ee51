//! Google OAuth2 provider
//!
//! Besides mapping Google identities onto local users, the provider can look
//! up the Workspace groups of the signing-in user with a service account that
//! impersonates a domain admin.

mod authenticator;
mod config;
mod errors;
mod groups;
mod service_account;

pub use authenticator::{GoogleOAuth2Authenticator, PROVIDER_NAME};
pub use config::{
    DEFAULT_SCOPE, GOOGLE_AUTHORIZE_URL, GOOGLE_DIRECTORY_BASE_URL, GOOGLE_OAUTH2_BASE_URL,
    GoogleOAuth2Settings,
};
pub use errors::GroupsError;
pub use groups::{DirectoryClient, GroupPage, GroupPageSource, collect_groups, fetch_user_groups};
pub use service_account::{GROUPS_SCOPE, JWT_BEARER_GRANT, ServiceAccountKey, fetch_access_token};
