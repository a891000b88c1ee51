//! Workspace group enumeration through the Directory API

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::transport::HttpTransport;
use crate::auth::types::DirectoryGroup;

use super::config::GoogleOAuth2Settings;
use super::errors::GroupsError;
use super::service_account::{ServiceAccountKey, fetch_access_token};

/// One page of `groups.list`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    #[serde(default)]
    pub groups: Vec<DirectoryGroup>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Something that can return the groups of a user one page at a time
#[async_trait]
pub trait GroupPageSource: Send + Sync {
    async fn fetch_page(
        &self,
        user_key: &str,
        page_token: Option<&str>,
    ) -> Result<GroupPage, GroupsError>;
}

/// `groups.list` over HTTP with a service account access token
pub struct DirectoryClient<'a> {
    transport: &'a HttpTransport,
    groups_url: String,
    access_token: String,
}

impl<'a> DirectoryClient<'a> {
    pub fn new(transport: &'a HttpTransport, groups_url: String, access_token: String) -> Self {
        Self {
            transport,
            groups_url,
            access_token,
        }
    }
}

#[async_trait]
impl GroupPageSource for DirectoryClient<'_> {
    async fn fetch_page(
        &self,
        user_key: &str,
        page_token: Option<&str>,
    ) -> Result<GroupPage, GroupsError> {
        let mut query = vec![("userKey", user_key)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .transport
            .get(&self.groups_url, Some(self.access_token.as_str()), &query)
            .await
            .map_err(|e| GroupsError::Transport(e.to_string()))?;

        if !response.is_ok() {
            return Err(GroupsError::Page {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        Ok(response.json()?)
    }
}

/// Follow continuation tokens until the last page
///
/// A failed page ends the walk; whatever was collected so far is returned.
pub async fn collect_groups(source: &dyn GroupPageSource, user_key: &str) -> Vec<DirectoryGroup> {
    let mut groups = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = match source.fetch_page(user_key, page_token.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    user_key,
                    collected = groups.len(),
                    error = %e,
                    "failed to retrieve groups for {user_key}"
                );
                break;
            }
        };

        groups.extend(page.groups);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    groups
}

/// Groups of the Google user `uid`, or `None` when they cannot be determined
///
/// Any failure before the first page (bad credentials, rejected assertion)
/// yields `None`. Failures while paging return the groups seen so far.
#[tracing::instrument(skip(settings, transport))]
pub async fn fetch_user_groups(
    settings: &GoogleOAuth2Settings,
    transport: &HttpTransport,
    uid: &str,
) -> Option<Vec<DirectoryGroup>> {
    let (Some(json), Some(admin_email)) = (
        settings.service_account_json.as_deref(),
        settings.service_account_admin_email.as_deref(),
    ) else {
        tracing::warn!("Group lookup requested without service account settings");
        return None;
    };

    let key = match ServiceAccountKey::from_json(json) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "failed to load service account credentials");
            return None;
        }
    };

    let access_token =
        match fetch_access_token(transport, &key, &settings.token_url(), admin_email).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "failed to retrieve access token for groups lookup");
                return None;
            }
        };

    let client = DirectoryClient::new(transport, settings.groups_url(), access_token);
    let groups = collect_groups(&client, uid).await;

    tracing::debug!(count = groups.len(), "Groups retrieved");
    Some(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Pages keyed by the token that requests them; `None` is the first page
    struct ScriptedPages {
        pages: HashMap<Option<String>, Result<GroupPage, GroupsError>>,
        requested: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedPages {
        fn new(pages: Vec<(Option<&str>, Result<GroupPage, GroupsError>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(token, page)| (token.map(str::to_string), page))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<Option<String>> {
            self.requested.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl GroupPageSource for ScriptedPages {
        async fn fetch_page(
            &self,
            _user_key: &str,
            page_token: Option<&str>,
        ) -> Result<GroupPage, GroupsError> {
            let key = page_token.map(str::to_string);
            self.requested.lock().expect("lock").push(key.clone());
            self.pages
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Err(GroupsError::InvalidResponse("unexpected page".into())))
        }
    }

    fn group(id: &str) -> DirectoryGroup {
        DirectoryGroup {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: id.to_string(),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> GroupPage {
        GroupPage {
            groups: ids.iter().map(|id| group(id)).collect(),
            next_page_token: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_follows_tokens_until_last_page() {
        let source = ScriptedPages::new(vec![
            (None, Ok(page(&["a", "b"], Some("p2")))),
            (Some("p2"), Ok(page(&["c"], Some("p3")))),
            (Some("p3"), Ok(page(&["d"], None))),
        ]);

        let groups = collect_groups(&source, "12345").await;
        let ids: Vec<_> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
        assert_eq!(
            source.requested(),
            [None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_failed_page_with_partial_result() {
        let source = ScriptedPages::new(vec![
            (None, Ok(page(&["a"], Some("p2")))),
            (
                Some("p2"),
                Err(GroupsError::Page {
                    status: 500,
                    body: String::new(),
                }),
            ),
            (Some("p3"), Ok(page(&["never"], None))),
        ]);

        let groups = collect_groups(&source, "12345").await;
        assert_eq!(groups, vec![group("a")]);
        assert_eq!(source.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_returns_empty() {
        let source = ScriptedPages::new(vec![(
            None,
            Err(GroupsError::Page {
                status: 403,
                body: "forbidden".into(),
            }),
        )]);

        assert!(collect_groups(&source, "12345").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_next_page_token_ends_walk() {
        let source = ScriptedPages::new(vec![(None, Ok(page(&["a"], Some(""))))]);
        assert_eq!(collect_groups(&source, "12345").await.len(), 1);
        assert_eq!(source.requested().len(), 1);
    }

    #[test]
    fn test_group_page_without_groups_field() {
        let page: GroupPage =
            serde_json::from_str(r#"{"kind":"admin#directory#groups"}"#).expect("page");
        assert!(page.groups.is_empty());
        assert_eq!(page.next_page_token, None);
    }

    #[tokio::test]
    async fn test_fetch_user_groups_without_credentials_is_none() {
        let settings = GoogleOAuth2Settings::default();
        let transport = HttpTransport::new(false).expect("client");
        assert_eq!(fetch_user_groups(&settings, &transport, "12345").await, None);
    }

    #[tokio::test]
    async fn test_fetch_user_groups_with_bad_json_is_none() {
        let settings = GoogleOAuth2Settings {
            service_account_json: Some("not json".to_string()),
            service_account_admin_email: Some("admin@example.com".to_string()),
            ..Default::default()
        };
        let transport = HttpTransport::new(false).expect("client");
        assert_eq!(fetch_user_groups(&settings, &transport, "12345").await, None);
    }
}
