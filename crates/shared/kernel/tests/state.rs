use farm_kernel::domain::app_data::AppDataKey;
use farm_kernel::domain::constants::{APP_DATA_KEY, SALES_KEY, PROFILE_KEY};
use farm_kernel::domain::records::Sale;
use farm_kernel::events::EventBus;
use farm_kernel::state::{AppState, PersistOutcome, RestoreOutcome};
use farm_kernel::storage::LocalStore;
use tempfile::TempDir;

async fn store(dir: &TempDir) -> LocalStore {
    LocalStore::builder().root(dir.path()).open().await.unwrap()
}

fn sale(id: &str, quantity: f64) -> Sale {
    Sale { id: id.to_owned(), product: "eggs".to_owned(), quantity, unit_price: 0.5, ..Sale::default() }
}

#[tokio::test]
async fn persist_then_restore_reproduces_data() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(Some(store(&dir).await), EventBus::new());
    state.update(|d| {
        d.profile.farm_name = "Riverside".to_owned();
        d.sales = vec![sale("s1", 10.0), sale("s2", 4.0)];
        d.settings.currency = "EUR".to_owned();
    });
    assert!(matches!(state.persist().await, PersistOutcome::Saved { .. }));

    let fresh = AppState::new(Some(store(&dir).await), EventBus::new());
    assert_eq!(fresh.restore().await, RestoreOutcome::Snapshot);
    assert_eq!(fresh.snapshot(), state.snapshot());
}

#[tokio::test]
async fn corrupt_snapshot_without_fallback_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let local = store(&dir).await;
    local.set_item(APP_DATA_KEY, "{not json").await.unwrap();

    let state = AppState::new(Some(local), EventBus::new());
    state.update(|d| d.profile.farm_name = "Unsaved".to_owned());
    assert_eq!(state.restore().await, RestoreOutcome::Untouched);
    assert_eq!(state.read(|d| d.profile.farm_name.clone()), "Unsaved");
}

#[tokio::test]
async fn per_key_data_is_used_when_snapshot_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let local = store(&dir).await;
    local.set_item(SALES_KEY, r#"[{"id":"old","product":"milk","quantity":2,"unitPrice":1.5}]"#).await.unwrap();
    local.set_item(PROFILE_KEY, r#"{"farmName":"Old Farm","extra":"ignored"}"#).await.unwrap();
    local.set_item("mortalityRecords", "garbage").await.unwrap();

    let state = AppState::new(Some(local), EventBus::new());
    let outcome = state.restore().await;

    assert_eq!(outcome, RestoreOutcome::Legacy(vec![AppDataKey::Profile, AppDataKey::Sales]));
    state.read(|d| {
        assert_eq!(d.profile.farm_name, "Old Farm");
        assert_eq!(d.sales[0].product, "milk");
        assert!(d.mortality_records.is_empty());
    });
}

#[tokio::test]
async fn valid_snapshot_wins_over_per_key_data() {
    let dir = tempfile::tempdir().unwrap();
    let local = store(&dir).await;
    local.set_item(APP_DATA_KEY, r#"{"sales":[{"id":"new"}]}"#).await.unwrap();
    local.set_item(SALES_KEY, r#"[{"id":"old"},{"id":"older"}]"#).await.unwrap();

    let state = AppState::new(Some(local), EventBus::new());
    assert_eq!(state.restore().await, RestoreOutcome::Snapshot);
    assert_eq!(state.read(|d| d.sales.iter().map(|s| s.id.clone()).collect::<Vec<_>>()), ["new"]);
}

#[tokio::test]
async fn overlapping_persists_keep_the_newest_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(Some(store(&dir).await), EventBus::new());
    state.update(|d| d.sales = vec![sale("v1", 1.0)]);

    // The first write serializes `[v1]` and parks on file I/O.
    let first = tokio::spawn({
        let state = state.clone();
        async move { state.persist().await }
    });
    tokio::task::yield_now().await;

    state.update(|d| d.sales.push(sale("v2", 2.0)));
    let second = state.persist().await;
    let first = first.await.unwrap();
    assert!(matches!(first, PersistOutcome::Saved { .. }));
    assert!(matches!(second, PersistOutcome::Saved { .. }));

    let fresh = AppState::new(Some(store(&dir).await), EventBus::new());
    assert_eq!(fresh.restore().await, RestoreOutcome::Snapshot);
    assert_eq!(fresh.read(|d| d.sales.len()), 2);
    assert_eq!(fresh.snapshot(), state.snapshot());
}
