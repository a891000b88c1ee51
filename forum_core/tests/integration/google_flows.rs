use std::sync::Arc;

use forum_core::auth::google::{
    GROUPS_SCOPE, GoogleOAuth2Authenticator, GoogleOAuth2Settings, PROVIDER_NAME,
};
use forum_core::auth::{AuthExtra, AuthInfo};
use forum_core::{
    AuthToken, Authenticator, AuthenticatorSet, OAuthMiddleware, Revocable, RevokeOutcome,
    UserDefaults,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::json;

use crate::common::test_setup::{PUBLIC_KEY, SERVICE_ACCOUNT_EMAIL};
use crate::common::{MockGoogle, MockGoogleConfig, TestStores, service_account_json};

const ADMIN_EMAIL: &str = "workspace-admin@example.com";
const GOOGLE_UID: &str = "108234567890123456789";

fn settings_for(mock: &MockGoogle) -> GoogleOAuth2Settings {
    GoogleOAuth2Settings {
        enabled: true,
        client_id: "forum-client.apps.googleusercontent.com".to_string(),
        client_secret: "forum-client-secret".to_string(),
        hosted_domain: Some("example.com".to_string()),
        prompt: Some("select_account|consent".to_string()),
        hd_groups: true,
        service_account_admin_email: Some(ADMIN_EMAIL.to_string()),
        service_account_json: Some(service_account_json()),
        oauth2_base_url: mock.base_url.clone(),
        groups_base_url: mock.base_url.clone(),
        ..Default::default()
    }
}

fn authenticator(settings: GoogleOAuth2Settings, stores: &TestStores) -> GoogleOAuth2Authenticator {
    GoogleOAuth2Authenticator::new(
        settings,
        UserDefaults::default(),
        stores.users.clone(),
        stores.accounts.clone(),
    )
    .expect("authenticator")
}

fn google_token(email: &str) -> AuthToken {
    AuthToken {
        provider: PROVIDER_NAME.to_string(),
        uid: GOOGLE_UID.to_string(),
        info: AuthInfo {
            email: Some(email.to_string()),
            name: Some("Ada Lovelace".to_string()),
            nickname: None,
        },
        extra: AuthExtra {
            raw_info: json!({
                "sub": GOOGLE_UID,
                "email": email,
                "email_verified": true,
                "hd": "example.com"
            }),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ReceivedClaims {
    iss: String,
    sub: String,
    scope: String,
    iat: i64,
    exp: i64,
}

#[tokio::test]
async fn test_login_collects_groups_across_pages() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig::default()).await;
    let stores = TestStores::new().await;
    let auth = authenticator(settings_for(&mock), &stores);
    assert!(auth.provides_groups());

    let result = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;

    assert!(!result.failed);
    let user = result.user.expect("user should be created");
    assert_eq!(user.username, "ada");
    assert!(result.skip_email_validation);

    let groups = result.associated_groups.expect("groups should be looked up");
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Engineering", "All Staff", "Design"]);
    assert_eq!(groups[1].direct_members_count, Some(230));

    mock.recorded(|recorded| {
        assert_eq!(recorded.token_requests, 1);
        assert_eq!(
            recorded.group_requests,
            vec![
                (GOOGLE_UID.to_string(), None),
                (GOOGLE_UID.to_string(), Some("page-2".to_string())),
            ]
        );
    });
    Ok(())
}

#[tokio::test]
async fn test_assertion_impersonates_admin() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig::default()).await;
    let stores = TestStores::new().await;
    let settings = settings_for(&mock);
    let token_url = settings.token_url();
    let auth = authenticator(settings, &stores);

    auth.after_authenticate(&google_token("ada@example.com"), None)
        .await?;

    let assertion = mock.recorded(|r| r.assertions.first().cloned());
    let assertion = assertion.expect("token endpoint should receive an assertion");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_url.as_str()]);
    let claims = decode::<ReceivedClaims>(
        &assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes())?,
        &validation,
    )?
    .claims;

    assert_eq!(claims.iss, SERVICE_ACCOUNT_EMAIL);
    assert_eq!(claims.sub, ADMIN_EMAIL);
    assert_eq!(claims.scope, GROUPS_SCOPE);
    assert_eq!(claims.exp - claims.iat, 60);
    Ok(())
}

#[tokio::test]
async fn test_failed_page_keeps_earlier_groups() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig {
        fail_second_page: true,
        ..Default::default()
    })
    .await;
    let stores = TestStores::new().await;
    let auth = authenticator(settings_for(&mock), &stores);

    let result = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;

    assert!(result.user.is_some());
    let groups = result.associated_groups.expect("partial groups");
    let emails: Vec<_> = groups.iter().map(|g| g.email.as_str()).collect();
    assert_eq!(emails, ["engineering@example.com", "all-staff@example.com"]);
    Ok(())
}

#[tokio::test]
async fn test_rejected_assertion_still_signs_in() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig {
        reject_assertion: true,
        ..Default::default()
    })
    .await;
    let stores = TestStores::new().await;
    let auth = authenticator(settings_for(&mock), &stores);

    let result = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;

    assert!(!result.failed);
    assert!(result.user.is_some());
    assert_eq!(result.associated_groups, None);
    mock.recorded(|recorded| {
        assert_eq!(recorded.token_requests, 1);
        assert!(recorded.group_requests.is_empty());
    });
    Ok(())
}

#[tokio::test]
async fn test_groups_disabled_makes_no_directory_calls() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig::default()).await;
    let stores = TestStores::new().await;
    let auth = authenticator(
        GoogleOAuth2Settings {
            hd_groups: false,
            ..settings_for(&mock)
        },
        &stores,
    );
    assert!(!auth.provides_groups());

    let result = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;

    assert_eq!(result.associated_groups, None);
    mock.recorded(|recorded| {
        assert_eq!(recorded.token_requests, 0);
        assert!(recorded.group_requests.is_empty());
    });
    Ok(())
}

#[tokio::test]
async fn test_account_link_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockGoogle::start(MockGoogleConfig::default()).await;
    let stores = TestStores::new().await;
    let auth = authenticator(
        GoogleOAuth2Settings {
            hd_groups: false,
            ..settings_for(&mock)
        },
        &stores,
    );

    let result = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;
    let user = result.user.expect("user");

    assert_eq!(auth.description_for_user(&user).await?, "ada@example.com");
    let linked = stores
        .accounts
        .find_by_provider_uid(PROVIDER_NAME, GOOGLE_UID)
        .await?
        .expect("association should be stored");
    assert_eq!(linked.user_id, user.id);

    // Signing in again resolves the same user through the email
    let again = auth
        .after_authenticate(&google_token("ada@example.com"), None)
        .await?;
    assert_eq!(again.user.map(|u| u.id), Some(user.id));

    let revocable = auth.as_revocable().expect("google can revoke");
    assert_eq!(revocable.revoke(&user, false).await?, RevokeOutcome::Revoked);
    assert_eq!(auth.description_for_user(&user).await?, "");
    assert!(
        stores
            .accounts
            .find_by_provider_uid(PROVIDER_NAME, GOOGLE_UID)
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn test_registered_provider_builds_authorization_url() -> Result<(), Box<dyn std::error::Error>>
{
    let mock = MockGoogle::start(MockGoogleConfig::default()).await;
    let stores = TestStores::new().await;

    let mut set = AuthenticatorSet::new();
    set.add(Arc::new(authenticator(settings_for(&mock), &stores)))?;

    let mut middleware = OAuthMiddleware::new();
    set.register_all(&mut middleware)?;

    let options = middleware.get(PROVIDER_NAME).expect("google registered");
    assert!(options.skip_jwt);
    assert_eq!(options.token_url, format!("{}/token", mock.base_url));

    let url = middleware.authorization_url(
        PROVIDER_NAME,
        "https://forum.example.com/auth/google_oauth2/callback",
        "state-123",
    )?;
    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let param = |name: &str| {
        query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };

    assert_eq!(param("client_id"), Some("forum-client.apps.googleusercontent.com"));
    assert_eq!(param("hd"), Some("example.com"));
    assert_eq!(param("prompt"), Some("select_account consent"));
    assert_eq!(param("state"), Some("state-123"));
    Ok(())
}
