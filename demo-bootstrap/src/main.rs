use std::{env, sync::Arc};

use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forum_core::auth::accounts::AccountStore;
use forum_core::auth::google::{GoogleOAuth2Authenticator, GoogleOAuth2Settings, PROVIDER_NAME};
use forum_core::category::CategoryStore;
use forum_core::settings::SiteSettingStore;
use forum_core::userdb::UserStore;
use forum_core::{
    AuthenticatorSet, CategorySeeder, OAuthMiddleware, SeedText, StorageConfig, UserDefaults,
};

/// Prepares a fresh site: seeds the default categories and wires up the
/// configured sign-in providers.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("forum_core=debug,{}=debug,info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = StorageConfig::from_env()?.connect()?;

    let users = UserStore::new(store.clone());
    let accounts = AccountStore::new(store.clone());
    let categories = CategoryStore::new(store.clone());
    let settings = SiteSettingStore::new(store);

    users.init().await?;
    accounts.init().await?;
    categories.init().await?;
    settings.init().await?;

    let locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());
    let seeder = CategorySeeder::new(
        SeedText::for_locale(&locale),
        users.clone(),
        categories,
        settings,
    );
    seeder.create(None).await?;

    for option in seeder.reseed_options().await? {
        tracing::info!(
            setting = %option.id,
            name = %option.name,
            unchanged = option.selected,
            "Default category"
        );
    }

    let google = GoogleOAuth2Authenticator::new(
        GoogleOAuth2Settings::from_env()?,
        UserDefaults::from_env()?,
        users,
        accounts,
    )?;

    let mut authenticators = AuthenticatorSet::new();
    authenticators.add(Arc::new(google))?;

    let mut middleware = OAuthMiddleware::new();
    authenticators.register_all(&mut middleware)?;

    if middleware.get(PROVIDER_NAME).is_some() {
        let origin = env::var("ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let url = middleware.authorization_url(
            PROVIDER_NAME,
            &format!("{origin}/auth/{PROVIDER_NAME}/callback"),
            "demo-state",
        )?;
        println!("Sign in with Google: {url}");
    } else {
        tracing::info!("Google sign-in is disabled (ENABLE_GOOGLE_OAUTH2_LOGINS)");
    }

    Ok(())
}
