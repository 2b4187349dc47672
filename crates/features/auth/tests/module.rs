use farm_auth::{AuthError, SignInSync, descriptor, sign_in, sign_out};
use farm_kernel::domain::config::AppConfig;
use farm_kernel::events::EventReceiverExt;
use farm_kernel::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn config(user: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.remote.user_id = user.map(str::to_owned);
    config
}

#[test]
fn descriptor_is_flagged_as_auth() {
    let descriptor = descriptor();
    assert!(descriptor.is_auth_module());
}

#[tokio::test]
async fn only_the_configured_user_may_sign_in() {
    let app = AppContext::builder().config(config(Some("ranch-owner"))).state(AppState::detached()).build().unwrap();
    let token = CancellationToken::new();

    let err = sign_in(&app, "intruder", &token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials { .. }));
    assert!(!app.is_signed_in());

    assert_eq!(sign_in(&app, "ranch-owner", &token).await.unwrap(), SignInSync::LocalOnly);
    assert!(app.is_signed_in());
}

#[tokio::test]
async fn sign_in_pulls_remote_data() {
    let remote = Arc::new(MemoryDocumentStore::new());
    remote
        .replace_collection("u9", AppDataKey::Sales, vec![json!({ "id": "r1", "product": "wool" })])
        .await
        .unwrap();
    let app = AppContext::builder().state(AppState::detached()).remote(remote).build().unwrap();

    let outcome = sign_in(&app, "u9", &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, SignInSync::Pulled(1));
    assert_eq!(app.state().read(|d| d.sales[0].product.clone()), "wool");

    app.registry().register(descriptor()).unwrap();
    let mut router = Router::new(app.clone());
    router.navigate_to("auth").unwrap();
    assert!(app.region().markup().contains("Signed in as <strong>u9</strong>"));

    sign_out(&app).await.unwrap();
    assert!(!app.is_signed_in());
}

#[tokio::test]
async fn offline_remote_raises_a_notification() {
    let remote = Arc::new(MemoryDocumentStore::new());
    remote.set_offline(true);
    let app = AppContext::builder().state(AppState::detached()).remote(remote).build().unwrap();
    let mut notes = app.events().subscribe::<Notification>().unwrap();

    let outcome = sign_in(&app, "u1", &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, SignInSync::Failed);
    assert!(app.is_signed_in());

    let note = notes.next_event().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Warning);
    assert_eq!(note.module.as_deref(), Some("auth"));
}

#[tokio::test]
async fn continue_button_leads_to_the_default_module() {
    let app = AppContext::builder().state(AppState::detached()).build().unwrap();
    app.registry().register(descriptor()).unwrap();
    app.registry()
        .register(ModuleDescriptor::builder("dashboard").template("<section>home</section>").build())
        .unwrap();
    sign_in(&app, "shepherd", &CancellationToken::new()).await.unwrap();

    let mut router = Router::new(app.clone());
    router.navigate_to("auth").unwrap();
    assert!(app.region().markup().contains("Signed in as <strong>shepherd</strong>"));

    assert!(router.click("continue").unwrap());
    assert_eq!(router.active_module(), Some("dashboard"));
}
