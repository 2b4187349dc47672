use farm::kernel::prelude::*;
use farm::kernel::storage::LocalStore;
use farm::kernel::events::EventBus;
use farm::{install_navigation, register_all};

#[test]
fn every_module_registers_once() {
    let registry = ModuleRegistry::new();
    register_all(&registry).unwrap();
    assert_eq!(
        registry.names(),
        ["auth", "dashboard", "feed-record", "mortality", "profile", "sales"]
    );
    assert!(matches!(register_all(&registry), Err(RegistryError::AlreadyRegistered { .. })));
    assert!(registry.lookup("Auth.js").unwrap().is_auth_module());
    assert!(farm::is_auth_route(" AUTH "));
}

#[test]
fn all_menu_targets_render() {
    let app = AppContext::builder().state(AppState::detached()).build().unwrap();
    register_all(app.registry()).unwrap();
    let mut router = Router::new(app.clone());
    install_navigation(&mut router);

    for (target, _) in farm::NAVIGATION {
        router.navigate_to(target).unwrap();
        assert_eq!(router.active_module(), Some(target));
        assert_eq!(router.nav_items().iter().filter(|item| item.active).count(), 1);
        assert!(!app.region().markup().is_empty());
    }
}

#[tokio::test]
async fn data_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = LocalStore::builder().root(dir.path()).open().await.unwrap();
        let app = AppContext::builder()
            .state(AppState::new(Some(store), EventBus::new()))
            .build()
            .unwrap();
        farm::features::sales::add_sale(
            &app,
            farm::features::sales::NewSale {
                product: "Honey".to_owned(),
                quantity: 3.0,
                unit_price: 8.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let store = LocalStore::builder().root(dir.path()).open().await.unwrap();
    let app = AppContext::builder().state(AppState::new(Some(store), EventBus::new())).build().unwrap();
    assert_eq!(app.state().restore().await, RestoreOutcome::Snapshot);
    register_all(app.registry()).unwrap();

    let mut router = Router::new(app.clone());
    router.go_to_default().unwrap();
    assert!(app.region().markup().contains(r#"<strong data-stat="sales-count">1</strong>"#));
}
