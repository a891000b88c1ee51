//! Service account credentials and the JWT bearer exchange
//!
//! Each lookup signs a fresh assertion and trades it for a short-lived access
//! token. Nothing is cached between logins.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::auth::transport::HttpTransport;

use super::errors::GroupsError;

/// Read-only access to Workspace groups
pub const GROUPS_SCOPE: &str = "https://www.googleapis.com/auth/admin.directory.group.readonly";

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime in seconds
const ASSERTION_TTL: i64 = 60;

/// The fields of a Google service account key file this crate uses
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[FILTERED]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct AssertionClaims {
    pub(crate) iss: String,
    pub(crate) aud: String,
    pub(crate) scope: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) sub: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, GroupsError> {
        serde_json::from_str(json).map_err(|e| GroupsError::ServiceAccount(e.to_string()))
    }

    pub(crate) fn claims(&self, audience: &str, subject: &str, now: i64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            aud: audience.to_string(),
            scope: GROUPS_SCOPE.to_string(),
            iat: now,
            exp: now + ASSERTION_TTL,
            sub: subject.to_string(),
        }
    }

    /// RS256-signed assertion impersonating `subject`
    pub fn assertion(&self, audience: &str, subject: &str) -> Result<String, GroupsError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| GroupsError::ServiceAccount(e.to_string()))?;
        let claims = self.claims(audience, subject, Utc::now().timestamp());

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| GroupsError::Signing(e.to_string()))
    }
}

/// Trade a signed assertion for an access token at `token_url`
#[tracing::instrument(skip(transport, key), fields(client_email = %key.client_email))]
pub async fn fetch_access_token(
    transport: &HttpTransport,
    key: &ServiceAccountKey,
    token_url: &str,
    admin_email: &str,
) -> Result<String, GroupsError> {
    let assertion = key.assertion(token_url, admin_email)?;

    let response = transport
        .post_form(
            token_url,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)],
        )
        .await
        .map_err(|e| GroupsError::Transport(e.to_string()))?;

    if !response.is_ok() {
        return Err(GroupsError::TokenExchange {
            status: response.status.as_u16(),
            body: response.body,
        });
    }

    let token: TokenResponse = response.json()?;
    Ok(token.access_token)
}
