//! Third-party authentication
//!
//! [`Authenticator`] is the contract the login flow drives for every provider.
//! Providers register their OAuth2 client options with an [`OAuthMiddleware`]
//! at startup and turn each callback's [`AuthToken`] into an [`AuthResult`].

pub mod accounts;
mod authenticator;
mod errors;
pub mod google;
mod middleware;
mod transport;
mod types;

pub use authenticator::{Authenticator, AuthenticatorSet, Revocable};
pub use errors::AuthError;
pub use middleware::{OAuth2ProviderOptions, OAuthMiddleware};
pub use transport::{HttpTransport, TransportResponse};
pub use types::{AuthExtra, AuthInfo, AuthResult, AuthToken, DirectoryGroup, RevokeOutcome};
