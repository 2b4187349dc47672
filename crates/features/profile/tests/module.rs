use farm_kernel::domain::config::AppConfig;
use farm_kernel::prelude::*;
use farm_profile::{ProfileError, descriptor, publish_profile, save_profile};
use std::sync::Arc;

fn profile(name: &str) -> FarmProfile {
    FarmProfile { farm_name: name.to_owned(), owner_name: "Ada".to_owned(), ..FarmProfile::default() }
}

#[tokio::test]
async fn saved_profile_is_rendered() {
    let app = AppContext::builder().state(AppState::detached()).build().unwrap();
    app.registry().register(descriptor()).unwrap();

    save_profile(&app, profile("  Sunny <Side> ")).await.unwrap();
    let mut router = Router::new(app.clone());
    router.navigate_to("profile").unwrap();

    let markup = app.region().markup();
    assert!(markup.contains("<dd>Sunny &lt;Side&gt;</dd>"));
    assert!(markup.contains("<dt>Owner</dt><dd>Ada</dd>"));
}

#[tokio::test]
async fn invalid_profiles_leave_state_alone() {
    let app = AppContext::builder().state(AppState::detached()).build().unwrap();
    assert!(matches!(save_profile(&app, profile(" ")).await, Err(ProfileError::Validation { .. })));

    let bad_email = FarmProfile { email: "nobody".to_owned(), ..profile("Farm") };
    assert!(save_profile(&app, bad_email).await.is_err());
    assert!(!app.state().read(|d| d.profile.is_complete()));
}

#[tokio::test]
async fn publishing_needs_a_remote_store_and_a_user() {
    let state = AppState::detached();
    let app = AppContext::builder().state(state.clone()).build().unwrap();
    let token = CancellationToken::new();
    assert!(!publish_profile(&app, &token).await.unwrap());

    let remote = Arc::new(MemoryDocumentStore::new());
    let mut config = AppConfig::default();
    config.remote.user_id = Some("owner-7".to_owned());
    let app = AppContext::builder().config(config).state(state).remote(remote.clone()).build().unwrap();
    save_profile(&app, profile("Ridge")).await.unwrap();

    assert!(publish_profile(&app, &token).await.unwrap());
    let stored = remote.get_profile("owner-7").await.unwrap().unwrap();
    assert_eq!(stored.farm_name, "Ridge");

    remote.set_offline(true);
    assert!(matches!(publish_profile(&app, &token).await, Err(ProfileError::Remote { .. })));
}
