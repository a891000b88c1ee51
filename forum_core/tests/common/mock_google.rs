//! Axum mock of the Google token endpoint and the Directory `groups.list` API
//!
//! Each test starts its own server on an ephemeral port, so tests never share
//! state and can run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::Json,
    routing::{get, post},
};
use forum_core::auth::google::JWT_BEARER_GRANT;
use serde_json::{Value, json};

pub const MOCK_ACCESS_TOKEN: &str = "ya29.mock-directory-token";
const SECOND_PAGE_TOKEN: &str = "page-2";

#[derive(Clone, Debug, Default)]
pub struct MockGoogleConfig {
    /// Reject every assertion at the token endpoint
    pub reject_assertion: bool,
    /// Fail the request for the second page of groups
    pub fail_second_page: bool,
}

/// What the mock has been asked so far
#[derive(Debug, Default)]
pub struct Recorded {
    pub assertions: Vec<String>,
    pub token_requests: usize,
    /// `(userKey, pageToken)` of every groups request
    pub group_requests: Vec<(String, Option<String>)>,
}

#[derive(Clone)]
struct MockState {
    config: MockGoogleConfig,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockGoogle {
    pub base_url: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockGoogle {
    pub async fn start(config: MockGoogleConfig) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            config,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/token", post(token))
            .route("/admin/directory/v1/groups", get(groups))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Google server");
        let addr = listener.local_addr().expect("Mock server address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock Google server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            recorded,
        }
    }

    pub fn recorded<R>(&self, f: impl FnOnce(&Recorded) -> R) -> R {
        f(&self.recorded.lock().expect("recorded lock"))
    }
}

async fn token(
    State(state): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut recorded = state.recorded.lock().expect("recorded lock");
    recorded.token_requests += 1;

    if form.get("grant_type").map(String::as_str) != Some(JWT_BEARER_GRANT) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        );
    }
    let Some(assertion) = form.get("assertion") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_request" })),
        );
    };
    recorded.assertions.push(assertion.clone());

    if state.config.reject_assertion {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized_client",
                "error_description": "Client is unauthorized to retrieve access tokens using this method."
            })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": MOCK_ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3599
        })),
    )
}

async fn groups(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {MOCK_ACCESS_TOKEN}");
    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": 401, "message": "Login Required." } })),
        );
    }

    let user_key = query.get("userKey").cloned().unwrap_or_default();
    let page_token = query.get("pageToken").cloned();
    state
        .recorded
        .lock()
        .expect("recorded lock")
        .group_requests
        .push((user_key, page_token.clone()));

    match page_token.as_deref() {
        None => (
            StatusCode::OK,
            Json(json!({
                "kind": "admin#directory#groups",
                "groups": [
                    group("01", "engineering@example.com", "Engineering", "14"),
                    group("02", "all-staff@example.com", "All Staff", "230")
                ],
                "nextPageToken": SECOND_PAGE_TOKEN
            })),
        ),
        Some(SECOND_PAGE_TOKEN) if state.config.fail_second_page => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "code": 500, "message": "Backend Error" } })),
        ),
        Some(SECOND_PAGE_TOKEN) => (
            StatusCode::OK,
            Json(json!({
                "kind": "admin#directory#groups",
                "groups": [group("03", "design@example.com", "Design", "5")]
            })),
        ),
        Some(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "Invalid Input: pageToken" } })),
        ),
    }
}

fn group(id: &str, email: &str, name: &str, members: &str) -> Value {
    json!({
        "kind": "admin#directory#group",
        "id": id,
        "etag": "\"etag\"",
        "email": email,
        "name": name,
        "directMembersCount": members,
        "description": "",
        "adminCreated": true
    })
}
