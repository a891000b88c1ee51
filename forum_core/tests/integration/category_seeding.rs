use forum_core::category::{EVERYONE_GROUP, PermissionType, STAFF_GROUP};
use forum_core::seed::{
    DEFAULT_COMPOSER_CATEGORY_SETTING, GENERAL_CATEGORY_ID, META_CATEGORY_ID,
    SIDEBAR_CATEGORIES_SETTING, STAFF_CATEGORY_ID, UNCATEGORIZED_CATEGORY_ID,
};
use forum_core::userdb::NewUser;
use forum_core::{CategorySeeder, SeedText};

use crate::common::TestStores;

fn seeder(stores: &TestStores, text: SeedText) -> CategorySeeder {
    CategorySeeder::new(
        text,
        stores.users.clone(),
        stores.categories.clone(),
        stores.settings.clone(),
    )
}

async fn sign_up_first_person(stores: &TestStores) {
    stores
        .users
        .create_user(NewUser {
            username: "founder".to_string(),
            name: Some("Site Founder".to_string()),
            email: "founder@example.com".to_string(),
            active: true,
            approved: true,
            trust_level: 1,
        })
        .await
        .expect("create user");
}

#[tokio::test]
async fn test_first_boot_seeds_site() -> Result<(), Box<dyn std::error::Error>> {
    let stores = TestStores::new().await;
    let seeder = seeder(&stores, SeedText::english());

    seeder.create(None).await?;

    let names: Vec<_> = stores
        .categories
        .list()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Uncategorized", "Site Feedback", "Staff", "General"]);

    let staff_id = stores.settings.get_i64(STAFF_CATEGORY_ID).await?;
    let general_id = stores.settings.get_i64(GENERAL_CATEGORY_ID).await?;
    let meta_id = stores.settings.get_i64(META_CATEGORY_ID).await?;

    let staff_permissions = stores.categories.permissions(staff_id).await?;
    assert_eq!(staff_permissions.get(STAFF_GROUP), Some(&PermissionType::Full));
    assert_eq!(staff_permissions.get(EVERYONE_GROUP), None);

    assert_eq!(
        stores.settings.get_string(SIDEBAR_CATEGORIES_SETTING).await?,
        Some(format!("{meta_id}|{staff_id}|{general_id}"))
    );
    assert_eq!(
        stores.settings.get_i64(DEFAULT_COMPOSER_CATEGORY_SETTING).await?,
        general_id
    );

    let general = stores.categories.find(general_id).await?.expect("general");
    let topic_id = general.topic_id.expect("description topic");
    assert_eq!(
        stores.categories.topic_title(topic_id).await?.as_deref(),
        Some("About the General category")
    );

    let options = seeder.reseed_options().await?;
    assert_eq!(options.len(), 4);
    assert!(options.iter().all(|o| o.selected));
    Ok(())
}

#[tokio::test]
async fn test_second_run_creates_nothing_new() -> Result<(), Box<dyn std::error::Error>> {
    let stores = TestStores::new().await;
    let seeder = seeder(&stores, SeedText::english());

    seeder.create(None).await?;
    let first = stores.categories.list().await?;
    seeder.create(None).await?;
    let second = stores.categories.list().await?;

    assert_eq!(first.len(), second.len());
    assert_eq!(
        first.iter().map(|c| c.id).collect::<Vec<_>>(),
        second.iter().map(|c| c.id).collect::<Vec<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn test_nothing_seeded_once_people_signed_up() -> Result<(), Box<dyn std::error::Error>> {
    let stores = TestStores::new().await;
    sign_up_first_person(&stores).await;

    seeder(&stores, SeedText::english()).create(None).await?;

    assert!(stores.categories.list().await?.is_empty());
    assert_eq!(stores.settings.get_i64(UNCATEGORIZED_CATEGORY_ID).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_restart_repairs_permissions_and_topics() -> Result<(), Box<dyn std::error::Error>> {
    let stores = TestStores::new().await;
    let seeder = seeder(&stores, SeedText::english());
    seeder.create(None).await?;
    sign_up_first_person(&stores).await;

    let staff_id = stores.settings.get_i64(STAFF_CATEGORY_ID).await?;
    let mut opened = stores.categories.permissions(staff_id).await?;
    opened.insert(EVERYONE_GROUP.to_string(), PermissionType::ReadOnly);
    stores.categories.set_permissions(staff_id, &opened).await?;

    let meta_id = stores.settings.get_i64(META_CATEGORY_ID).await?;
    let meta = stores.categories.find(meta_id).await?.expect("meta");
    stores
        .categories
        .delete_topic(meta.topic_id.expect("meta topic"))
        .await?;

    seeder.create(None).await?;

    let repaired = stores.categories.permissions(staff_id).await?;
    assert_eq!(repaired.len(), 1);
    assert_eq!(repaired.get(STAFF_GROUP), Some(&PermissionType::Full));

    let meta = stores.categories.find(meta_id).await?.expect("meta");
    let topic_id = meta.topic_id.expect("recreated topic");
    assert!(stores.categories.topic_exists(topic_id).await?);
    assert_eq!(stores.categories.list().await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_update_switches_language() -> Result<(), Box<dyn std::error::Error>> {
    let stores = TestStores::new().await;
    seeder(&stores, SeedText::english()).create(None).await?;

    let german = seeder(&stores, SeedText::for_locale("de_DE"));
    german.update(None, true).await?;

    let names: Vec<_> = stores
        .categories
        .list()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Unkategorisiert", "Website-Feedback", "Team", "Allgemein"]);

    let general_id = stores.settings.get_i64(GENERAL_CATEGORY_ID).await?;
    let general = stores.categories.find(general_id).await?.expect("general");
    let post = stores
        .categories
        .first_post(&general)
        .await?
        .expect("description post");
    assert_eq!(
        post.raw,
        "Erstelle hier Themen, die in keine andere Kategorie passen."
    );
    assert_eq!(
        stores
            .categories
            .topic_title(general.topic_id.expect("topic"))
            .await?
            .as_deref(),
        Some("Über die Kategorie Allgemein")
    );
    Ok(())
}
