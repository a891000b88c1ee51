//! Provider registry for the shared OAuth2 pipeline
//!
//! Authenticators describe themselves with plain [`OAuth2ProviderOptions`]
//! values. The redirect and callback handling that consumes them lives outside
//! this crate; the registry only renders the authorization request.

use std::collections::BTreeMap;

use url::Url;

use super::errors::AuthError;
use super::transport::HttpTransport;

/// Everything the OAuth2 client needs to drive one provider
#[derive(Debug, Clone)]
pub struct OAuth2ProviderOptions {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub scope: String,
    /// Restrict sign-in to a hosted domain (`hd`)
    pub hosted_domain: Option<String>,
    /// Space-separated `prompt` values
    pub prompt: Option<String>,
    /// Trust the access token instead of validating the id token JWT
    pub skip_jwt: bool,
    pub transport: HttpTransport,
}

/// Registered providers, keyed by name
#[derive(Debug, Default)]
pub struct OAuthMiddleware {
    providers: BTreeMap<String, OAuth2ProviderOptions>,
}

impl OAuthMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider; each name may only be registered once
    pub fn provider(&mut self, options: OAuth2ProviderOptions) -> Result<(), AuthError> {
        if self.providers.contains_key(&options.name) {
            return Err(AuthError::DuplicateProvider(options.name));
        }

        tracing::info!(
            provider = %options.name,
            hosted_domain = ?options.hosted_domain,
            skip_jwt = options.skip_jwt,
            verbose = options.transport.is_verbose(),
            "OAuth2 provider registered"
        );
        self.providers.insert(options.name.clone(), options);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OAuth2ProviderOptions> {
        self.providers.get(name)
    }

    pub fn providers(&self) -> impl Iterator<Item = &OAuth2ProviderOptions> {
        self.providers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Authorization request URL for `provider`
    pub fn authorization_url(
        &self,
        provider: &str,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url, AuthError> {
        let options = self
            .get(provider)
            .ok_or_else(|| AuthError::UnknownProvider(provider.to_string()))?;

        let mut url = Url::parse(&options.authorize_url).map_err(|e| {
            AuthError::Misconfigured(format!("{}: authorize url: {e}", options.name))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &options.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", &options.scope)
                .append_pair("state", state);
            if let Some(hd) = &options.hosted_domain {
                query.append_pair("hd", hd);
            }
            if let Some(prompt) = &options.prompt {
                query.append_pair("prompt", prompt);
            }
        }

        Ok(url)
    }
}
