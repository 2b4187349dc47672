use farm_kernel::prelude::*;
use farm_sales::{NewSale, SalesError, add_sale, descriptor, remove_sale, summary};

fn app() -> AppContext {
    AppContext::builder().state(AppState::detached()).build().unwrap()
}

fn eggs(quantity: f64) -> NewSale {
    NewSale { product: "Eggs".to_owned(), quantity, unit_price: 0.25, ..NewSale::default() }
}

#[tokio::test]
async fn recorded_sales_show_up_in_the_module() {
    let app = app();
    app.registry().register(descriptor()).unwrap();

    let sale = add_sale(&app, eggs(24.0)).await.unwrap();
    assert_eq!(sale.id.len(), 12);
    assert_eq!(sale.date.len(), 10);

    let mut router = Router::new(app.clone());
    router.navigate_to("sales.js").unwrap();
    let markup = app.region().markup();
    assert!(markup.contains(r#"<span data-stat="sales-count">1</span>"#));
    assert!(markup.contains(&format!(r#"data-id="{}""#, sale.id)));
}

#[tokio::test]
async fn invalid_sales_are_rejected() {
    let app = app();
    let err = add_sale(&app, NewSale { product: " ".to_owned(), ..eggs(1.0) }).await.unwrap_err();
    assert!(matches!(err, SalesError::Validation { .. }));
    assert!(add_sale(&app, eggs(0.0)).await.is_err());
    assert!(add_sale(&app, NewSale { unit_price: -1.0, ..eggs(1.0) }).await.is_err());
    assert_eq!(app.state().read(|d| d.sales.len()), 0);
}

#[tokio::test]
async fn sales_persist_and_can_be_removed() {
    let dir = tempfile::tempdir().unwrap();
    let store = farm_kernel::storage::LocalStore::builder().root(dir.path()).open().await.unwrap();
    let state = AppState::new(Some(store.clone()), farm_kernel::events::EventBus::new());
    let app = AppContext::builder().state(state).build().unwrap();

    let first = add_sale(&app, eggs(6.0)).await.unwrap();
    add_sale(&app, NewSale { date: Some("2024-03-01".to_owned()), ..eggs(12.0) }).await.unwrap();

    let stored = store.get_item("appData").await.unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["sales"].as_array().unwrap().len(), 2);
    assert_eq!(stored["sales"][1]["date"], "2024-03-01");

    assert!(remove_sale(&app, &first.id).await);
    assert!(!remove_sale(&app, &first.id).await);
    assert_eq!(app.state().read(summary).count, 1);
}

#[tokio::test]
async fn failed_writes_keep_the_sale_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let store = farm_kernel::storage::LocalStore::builder().root(dir.path()).open().await.unwrap();
    let state = AppState::new(Some(store), farm_kernel::events::EventBus::new());
    let app = AppContext::builder().state(state).build().unwrap();
    std::fs::remove_dir_all(dir.path()).unwrap();

    let sale = add_sale(&app, eggs(6.0)).await.unwrap();
    assert_eq!(app.state().read(|d| d.sales[0].id.clone()), sale.id);
    assert_eq!(app.state().persist().await, PersistOutcome::Failed);
    assert!(remove_sale(&app, &sale.id).await);
}
