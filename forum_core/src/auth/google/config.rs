use crate::config::{ConfigError, env_bool, env_required, env_string};

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_OAUTH2_BASE_URL: &str = "https://oauth2.googleapis.com";
pub const GOOGLE_DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com";
pub const DEFAULT_SCOPE: &str = "openid email profile";

/// Site settings for Google sign-in and Workspace group lookups
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleOAuth2Settings {
    pub enabled: bool,
    pub client_id: String,
    pub client_secret: String,
    /// Restrict sign-in to one Workspace domain
    pub hosted_domain: Option<String>,
    /// `|`-separated prompt values, e.g. `select_account|consent`
    pub prompt: Option<String>,
    pub verbose_logging: bool,
    /// Fetch Workspace groups on login
    pub hd_groups: bool,
    /// Workspace admin impersonated by the service account
    pub service_account_admin_email: Option<String>,
    /// Service account key file contents
    pub service_account_json: Option<String>,
    pub scope: String,
    pub authorize_url: String,
    pub oauth2_base_url: String,
    pub groups_base_url: String,
}

impl Default for GoogleOAuth2Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            hosted_domain: None,
            prompt: None,
            verbose_logging: false,
            hd_groups: false,
            service_account_admin_email: None,
            service_account_json: None,
            scope: DEFAULT_SCOPE.to_string(),
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            oauth2_base_url: GOOGLE_OAUTH2_BASE_URL.to_string(),
            groups_base_url: GOOGLE_DIRECTORY_BASE_URL.to_string(),
        }
    }
}

impl GoogleOAuth2Settings {
    /// Read the settings from the environment
    ///
    /// Client credentials are only required while the provider is enabled.
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = env_bool("ENABLE_GOOGLE_OAUTH2_LOGINS", false)?;

        let (client_id, client_secret) = if enabled {
            (
                env_required("GOOGLE_OAUTH2_CLIENT_ID")?,
                env_required("GOOGLE_OAUTH2_CLIENT_SECRET")?,
            )
        } else {
            (
                env_string("GOOGLE_OAUTH2_CLIENT_ID").unwrap_or_default(),
                env_string("GOOGLE_OAUTH2_CLIENT_SECRET").unwrap_or_default(),
            )
        };

        let defaults = Self::default();

        Ok(Self {
            enabled,
            client_id,
            client_secret,
            hosted_domain: env_string("GOOGLE_OAUTH2_HD"),
            prompt: env_string("GOOGLE_OAUTH2_PROMPT"),
            verbose_logging: env_bool("GOOGLE_OAUTH2_VERBOSE_LOGGING", false)?,
            hd_groups: env_bool("GOOGLE_OAUTH2_HD_GROUPS", false)?,
            service_account_admin_email: env_string(
                "GOOGLE_OAUTH2_HD_GROUPS_SERVICE_ACCOUNT_ADMIN_EMAIL",
            ),
            service_account_json: env_string("GOOGLE_OAUTH2_HD_GROUPS_SERVICE_ACCOUNT_JSON"),
            scope: env_string("GOOGLE_OAUTH2_SCOPE").unwrap_or(defaults.scope),
            authorize_url: env_string("GOOGLE_OAUTH2_AUTHORIZE_URL")
                .unwrap_or(defaults.authorize_url),
            oauth2_base_url: env_string("GOOGLE_OAUTH2_BASE_URL")
                .unwrap_or(defaults.oauth2_base_url),
            groups_base_url: env_string("GOOGLE_DIRECTORY_BASE_URL")
                .unwrap_or(defaults.groups_base_url),
        })
    }

    /// Prompt values as the authorization request expects them
    pub fn prompt_param(&self) -> Option<String> {
        let prompt = self
            .prompt
            .as_deref()?
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        (!prompt.is_empty()).then_some(prompt)
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.oauth2_base_url.trim_end_matches('/'))
    }

    pub fn groups_url(&self) -> String {
        format!(
            "{}/admin/directory/v1/groups",
            self.groups_base_url.trim_end_matches('/')
        )
    }

    /// Group lookups need a hosted domain, the feature flag, an admin to
    /// impersonate and service account credentials
    pub fn provides_groups(&self) -> bool {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        present(&self.hosted_domain)
            && self.hd_groups
            && present(&self.service_account_admin_email)
            && present(&self.service_account_json)
    }
}
