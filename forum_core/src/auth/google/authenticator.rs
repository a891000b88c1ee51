use async_trait::async_trait;
use serde_json::{Value, json};

use crate::auth::accounts::{AccountStore, NewAssociatedAccount};
use crate::auth::authenticator::{Authenticator, Revocable};
use crate::auth::errors::AuthError;
use crate::auth::middleware::{OAuth2ProviderOptions, OAuthMiddleware};
use crate::auth::transport::HttpTransport;
use crate::auth::types::{AuthResult, AuthToken, RevokeOutcome};
use crate::config::UserDefaults;
use crate::userdb::{NewUser, User, UserStore};

use super::config::GoogleOAuth2Settings;
use super::groups::fetch_user_groups;

pub const PROVIDER_NAME: &str = "google_oauth2";
const DISPLAY_NAME: &str = "Google";
const PROVIDER_URL: &str = "https://accounts.google.com";

/// Fallback when an email yields no usable username
const DEFAULT_USERNAME: &str = "user";

/// Sign-in with Google, with optional Workspace group lookup
pub struct GoogleOAuth2Authenticator {
    settings: GoogleOAuth2Settings,
    user_defaults: UserDefaults,
    users: UserStore,
    accounts: AccountStore,
    transport: HttpTransport,
}

impl GoogleOAuth2Authenticator {
    pub fn new(
        settings: GoogleOAuth2Settings,
        user_defaults: UserDefaults,
        users: UserStore,
        accounts: AccountStore,
    ) -> Result<Self, AuthError> {
        let transport = HttpTransport::new(settings.verbose_logging)?;
        Ok(Self {
            settings,
            user_defaults,
            users,
            accounts,
            transport,
        })
    }

    pub fn settings(&self) -> &GoogleOAuth2Settings {
        &self.settings
    }

    /// Whether Google reports the token's email as verified
    pub fn primary_email_verified(&self, token: &AuthToken) -> bool {
        token.email_verified().unwrap_or(false)
    }

    /// First of `base`, `base1`, `base2`, ... that nobody uses yet
    async fn unique_username(&self, base: &str) -> Result<String, AuthError> {
        if !self.users.username_exists(base).await? {
            return Ok(base.to_string());
        }

        let mut suffix: u64 = 1;
        loop {
            let candidate = format!("{base}{suffix}");
            if !self.users.username_exists(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    async fn remember_account(&self, user: &User, token: &AuthToken) -> Result<(), AuthError> {
        self.accounts
            .upsert(NewAssociatedAccount {
                provider_name: PROVIDER_NAME.to_string(),
                provider_uid: token.uid.clone(),
                user_id: user.id,
                email: token.info.email.clone(),
                name: token.info.name.clone(),
                info: account_info(token),
            })
            .await?;
        Ok(())
    }
}

/// Username candidate from the local part of `email`
pub(crate) fn username_candidate(email: &str) -> String {
    let local = match email.split_once('@') {
        Some((local, _)) => local,
        None => email,
    };
    let local = local.trim();

    if local.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        local.to_string()
    }
}

fn account_info(token: &AuthToken) -> Value {
    json!({
        "email": token.info.email,
        "name": token.info.name,
        "email_verified": token.email_verified(),
        "hd": token.extra.raw_info.get("hd"),
    })
}

#[async_trait]
impl Authenticator for GoogleOAuth2Authenticator {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn provider_url(&self) -> Option<&str> {
        Some(PROVIDER_URL)
    }

    fn enabled(&self) -> bool {
        self.settings.enabled
    }

    #[tracing::instrument(skip(self, token, existing_account), fields(uid = %token.uid))]
    async fn after_authenticate(
        &self,
        token: &AuthToken,
        existing_account: Option<&User>,
    ) -> Result<AuthResult, AuthError> {
        let email = token
            .info
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("token carries no email".to_string()))?;

        let mut result = AuthResult {
            email: Some(email.to_string()),
            name: token.info.name.clone(),
            // Linking to a signed-in account trusts only what Google verified
            skip_email_validation: self.primary_email_verified(token),
            ..Default::default()
        };
        result
            .extra_data
            .insert("google_user_id".to_string(), json!(token.uid));

        if self.provides_groups() {
            result.associated_groups =
                fetch_user_groups(&self.settings, &self.transport, &token.uid).await;
        }

        let user = if let Some(account) = existing_account {
            result.email_valid = account.email.eq_ignore_ascii_case(email);
            if account.name.is_some() {
                result.name = account.name.clone();
            }
            account.clone()
        } else if let Some(user) = self.users.find_by_email(email).await? {
            tracing::debug!(user_id = user.id, "Email matches existing user");
            result.email_valid = true;
            result.skip_email_validation = true;
            result.name = user.name.clone();
            user
        } else {
            let username = self.unique_username(&username_candidate(email)).await?;
            let user = self
                .users
                .create_user(NewUser {
                    username,
                    name: token.info.name.clone(),
                    email: email.to_string(),
                    active: true,
                    approved: true,
                    trust_level: self.user_defaults.default_trust_level,
                })
                .await?;
            result.email_valid = true;
            result.skip_email_validation = true;
            result.name = user.name.clone();
            user
        };

        result.username = Some(user.username.clone());

        self.remember_account(&user, token).await?;
        result.user = Some(user);

        Ok(result)
    }

    async fn after_create_account(&self, user: &User, token: &AuthToken) -> Result<(), AuthError> {
        self.remember_account(user, token).await
    }

    fn register_middleware(&self, middleware: &mut OAuthMiddleware) -> Result<(), AuthError> {
        if self.settings.client_id.is_empty() || self.settings.client_secret.is_empty() {
            return Err(AuthError::Misconfigured(format!(
                "{PROVIDER_NAME}: client id and secret are required"
            )));
        }

        middleware.provider(OAuth2ProviderOptions {
            name: PROVIDER_NAME.to_string(),
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            authorize_url: self.settings.authorize_url.clone(),
            token_url: self.settings.token_url(),
            scope: self.settings.scope.clone(),
            hosted_domain: self.settings.hosted_domain.clone(),
            prompt: self.settings.prompt_param(),
            skip_jwt: true,
            transport: self.transport.clone(),
        })
    }

    async fn description_for_user(&self, user: &User) -> Result<String, AuthError> {
        let account = self.accounts.find_for_user(PROVIDER_NAME, user.id).await?;
        Ok(account.and_then(|a| a.email).unwrap_or_default())
    }

    fn description_for_auth_token(&self, token: &AuthToken) -> String {
        token
            .info
            .email
            .clone()
            .or_else(|| token.info.name.clone())
            .unwrap_or_default()
    }

    fn can_connect_existing_user(&self) -> bool {
        true
    }

    fn as_revocable(&self) -> Option<&dyn Revocable> {
        Some(self)
    }

    fn provides_groups(&self) -> bool {
        self.settings.provides_groups()
    }
}

#[async_trait]
impl Revocable for GoogleOAuth2Authenticator {
    /// Google keeps no grant on our behalf, so clearing the link is all there is
    async fn revoke(&self, user: &User, _skip_remote: bool) -> Result<RevokeOutcome, AuthError> {
        self.accounts.delete_for_user(PROVIDER_NAME, user.id).await?;
        Ok(RevokeOutcome::Revoked)
    }
}
