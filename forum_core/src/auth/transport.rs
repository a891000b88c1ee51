//! HTTP transport shared by the OAuth2 provider options and group lookups
//!
//! With verbose logging on, every request and response is written to the
//! `debug` log including bodies. Form fields carrying secrets are masked.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::errors::AuthError;

const FILTERED: &str = "[FILTERED]";
const SENSITIVE_FIELDS: &[&str] = &[
    "client_secret",
    "assertion",
    "client_assertion",
    "code",
    "refresh_token",
    "access_token",
];

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    verbose: bool,
}

/// Status and raw body of a completed request
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl HttpTransport {
    pub fn new(verbose: bool) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self { client, verbose })
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// GET `url` with optional bearer credentials and query parameters
    pub async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<TransportResponse, AuthError> {
        if self.verbose {
            tracing::debug!(method = "GET", url, query = ?query, "OAuth request");
        }

        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        self.finish(request).await
    }

    /// POST `form` url-encoded to `url`
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<TransportResponse, AuthError> {
        if self.verbose {
            tracing::debug!(
                method = "POST",
                url,
                body = %redact_form(form),
                "OAuth request"
            );
        }

        self.finish(self.client.post(url).form(form)).await
    }

    async fn finish(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<TransportResponse, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if self.verbose {
            tracing::debug!(status = %status, body = %body, "OAuth response");
        }

        Ok(TransportResponse { status, body })
    }
}

/// Render form fields for logging with sensitive values masked
pub(crate) fn redact_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(key, value)| {
            if SENSITIVE_FIELDS.contains(key) {
                format!("{key}={FILTERED}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
