use farm_feed::{NewFeedRecord, add_feed_record, descriptor, usage};
use farm_kernel::prelude::*;

fn app() -> AppContext {
    let app = AppContext::builder().state(AppState::detached()).build().unwrap();
    app.registry().register(descriptor()).unwrap();
    app
}

fn mash(kg: f64) -> NewFeedRecord {
    NewFeedRecord { feed_type: "Layer mash".to_owned(), quantity_kg: kg, cost: 12.0, ..NewFeedRecord::default() }
}

#[tokio::test]
async fn each_visit_renders_current_records() {
    let app = app();
    let mut router = Router::new(app.clone());

    router.navigate_to("Feed-Record").unwrap();
    assert!(app.region().markup().contains("No feed recorded yet."));

    add_feed_record(&app, mash(25.0)).await.unwrap();
    router.navigate_to("feed-record").unwrap();
    let markup = app.region().markup();
    assert!(markup.contains(r#"<span data-stat="feed-kg">25.0</span>"#));
    assert!(markup.contains("<li>Layer mash: 25.0</li>"));
}

#[tokio::test]
async fn rejects_empty_or_non_positive_entries() {
    let app = app();
    assert!(add_feed_record(&app, NewFeedRecord::default()).await.is_err());
    assert!(add_feed_record(&app, mash(-3.0)).await.is_err());
    assert!(add_feed_record(&app, NewFeedRecord { cost: f64::NAN, ..mash(1.0) }).await.is_err());
    assert_eq!(app.state().read(usage).records, 0);
}

#[tokio::test]
async fn failed_writes_keep_the_record_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let store = farm_kernel::storage::LocalStore::builder().root(dir.path()).open().await.unwrap();
    let state = AppState::new(Some(store), farm_kernel::events::EventBus::new());
    let app = AppContext::builder().state(state).build().unwrap();
    std::fs::remove_dir_all(dir.path()).unwrap();

    add_feed_record(&app, mash(10.0)).await.unwrap();
    assert_eq!(app.state().persist().await, PersistOutcome::Failed);
    assert_eq!(usage(&app.state().snapshot()).records, 1);
}
