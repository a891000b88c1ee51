//! The contract every identity provider implements
//!
//! Required capabilities have no default body, so a provider that forgets one
//! fails to compile. Optional capabilities fall back to "not supported".

use std::sync::Arc;

use async_trait::async_trait;

use crate::userdb::User;

use super::errors::AuthError;
use super::middleware::OAuthMiddleware;
use super::types::{AuthResult, AuthToken, RevokeOutcome};

#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Stable provider identifier, e.g. `google_oauth2`
    fn name(&self) -> &str;

    fn display_name(&self) -> &str {
        self.name()
    }

    fn provider_url(&self) -> Option<&str> {
        None
    }

    fn enabled(&self) -> bool;

    /// Turn the provider's token into an [`AuthResult`]
    ///
    /// With `existing_account` the token is linked to that account instead of
    /// resolving or creating one.
    async fn after_authenticate(
        &self,
        token: &AuthToken,
        existing_account: Option<&User>,
    ) -> Result<AuthResult, AuthError>;

    /// Runs once the caller has created `user` from `token`
    async fn after_create_account(&self, _user: &User, _token: &AuthToken) -> Result<(), AuthError> {
        Ok(())
    }

    /// Register this provider with the OAuth2 pipeline
    fn register_middleware(&self, middleware: &mut OAuthMiddleware) -> Result<(), AuthError>;

    /// Connection status for `user`; empty means not connected
    async fn description_for_user(&self, _user: &User) -> Result<String, AuthError> {
        Ok(String::new())
    }

    fn description_for_auth_token(&self, _token: &AuthToken) -> String {
        String::new()
    }

    fn can_connect_existing_user(&self) -> bool {
        false
    }

    /// Revocation support, if the provider has any
    fn as_revocable(&self) -> Option<&dyn Revocable> {
        None
    }

    fn can_revoke(&self) -> bool {
        self.as_revocable().is_some()
    }

    fn provides_groups(&self) -> bool {
        false
    }
}

/// Providers that can disconnect a user
#[async_trait]
pub trait Revocable: Send + Sync {
    /// Drop the connection between `user` and the provider
    ///
    /// Returns [`RevokeOutcome::RemoteFailed`] when the provider could not be
    /// told while `skip_remote` is false.
    async fn revoke(&self, user: &User, skip_remote: bool) -> Result<RevokeOutcome, AuthError>;
}

/// The set of providers a site offers
#[derive(Clone, Default)]
pub struct AuthenticatorSet {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, authenticator: Arc<dyn Authenticator>) -> Result<(), AuthError> {
        if self.find(authenticator.name()).is_some() {
            return Err(AuthError::DuplicateProvider(authenticator.name().to_string()));
        }
        self.authenticators.push(authenticator);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn Authenticator>> {
        self.authenticators.iter().find(|a| a.name() == name)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Arc<dyn Authenticator>> {
        self.authenticators.iter().filter(|a| a.enabled())
    }

    /// Register every enabled provider with `middleware`
    pub fn register_all(&self, middleware: &mut OAuthMiddleware) -> Result<(), AuthError> {
        for authenticator in self.enabled() {
            authenticator.register_middleware(middleware)?;
        }
        Ok(())
    }
}
