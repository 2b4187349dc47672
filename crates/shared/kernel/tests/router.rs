use farm_kernel::context::AppContext;
use farm_kernel::module::{ModuleDescriptor, ModuleError};
use farm_kernel::router::{FailureReason, RouteChanged, RouteState, Router, RouterError};
use farm_kernel::state::AppState;
use farm_kernel::events::EventReceiverExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn router() -> Router {
    Router::new(AppContext::builder().state(AppState::detached()).build().unwrap())
}

fn counting(name: &str, calls: &Arc<AtomicUsize>) -> ModuleDescriptor {
    let calls = Arc::clone(calls);
    ModuleDescriptor::builder(name)
        .template("<section class=\"feed\"></section>")
        .initialize(move |ctx| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            ctx.render(format!("<section class=\"feed\">visit {n}</section>"));
            Ok(())
        })
        .build()
}

#[test]
fn every_navigation_reinitializes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = router();
    router.app().registry().register(counting("feed-record", &calls)).unwrap();

    router.navigate_to("feed-record").unwrap();
    router.navigate_to("feed-record").unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(router.app().region().markup().contains("visit 2"));
    assert_eq!(router.state(), &RouteState::Active("feed-record".to_owned()));
}

#[test]
fn failing_module_recovers_on_retry() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&healthy);
    let mut router = router();
    router
        .app()
        .registry()
        .register(
            ModuleDescriptor::builder("sales")
                .template("<section id=\"sales\"></section>")
                .initialize(move |ctx| {
                    if !flag.load(Ordering::SeqCst) {
                        return Err(ModuleError::Initialization {
                            message: "sales ledger unreadable".into(),
                            context: None,
                        });
                    }
                    ctx.render("<section id=\"sales\">ok</section>");
                    Ok(())
                })
                .build(),
        )
        .unwrap();

    let err = router.navigate_to("sales").unwrap_err();
    assert!(matches!(err, RouterError::Initialization { .. }));
    assert!(matches!(
        router.state(),
        RouteState::Failed { name, reason: FailureReason::Initialization(message) }
            if name == "sales" && message.contains("sales ledger unreadable")
    ));
    let panel = router.app().region().markup();
    assert!(panel.contains("module-error"));
    assert!(panel.contains("sales ledger unreadable"));

    healthy.store(true, Ordering::SeqCst);
    assert!(router.click("retry-module").unwrap());
    assert_eq!(router.active_module(), Some("sales"));
    assert_eq!(router.app().region().markup(), "<section id=\"sales\">ok</section>");
}

#[test]
fn missing_module_gets_placeholder() {
    let mut router = router();
    let err = router.navigate_to("feed-record").unwrap_err();

    assert!(matches!(err, RouterError::ModuleNotFound { ref name, .. } if name == "feed-record"));
    assert!(router.app().region().markup().contains("Feed Record"));
    assert_eq!(
        router.state(),
        &RouteState::Failed { name: "feed-record".to_owned(), reason: FailureReason::NotFound }
    );
}

#[test]
fn navigation_highlights_matching_item() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = router();
    router.app().registry().register(counting("dashboard", &calls)).unwrap();
    router.app().registry().register(counting("sales", &calls)).unwrap();
    router.add_nav_item("dashboard.js", "Dashboard");
    router.add_nav_item("sales.js", "Sales");

    router.navigate_to("Sales").unwrap();
    let active: Vec<&str> =
        router.nav_items().iter().filter(|item| item.active).map(|item| item.label.as_str()).collect();
    assert_eq!(active, ["Sales"]);

    router.handle_action("default").unwrap();
    assert_eq!(router.active_module(), Some("dashboard"));
    assert!(router.nav_items()[0].active);
    assert!(!router.nav_items()[1].active);
}

#[tokio::test]
async fn route_changes_are_published() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = router();
    router.app().registry().register(counting("mortality", &calls)).unwrap();
    let mut rx = router.app().events().subscribe::<RouteChanged>().unwrap();

    router.navigate_to("mortality.js").unwrap();
    let _ = router.navigate_to("ghost");

    let events = rx.drain();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].state, RouteState::Active("mortality".to_owned()));
    assert_eq!(events[1].module, "ghost");
}

#[test]
fn error_panel_leads_back_to_start() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = router();
    router.app().registry().register(counting("dashboard", &calls)).unwrap();
    router
        .app()
        .registry()
        .register(
            ModuleDescriptor::builder("mortality")
                .initialize(|_| Err(ModuleError::Initialization { message: "no batches".into(), context: None }))
                .build(),
        )
        .unwrap();

    assert!(router.navigate_to("mortality").is_err());
    assert!(router.app().region().markup().contains("go-default-module"));

    assert!(router.click("go-default-module").unwrap());
    assert_eq!(router.active_module(), Some("dashboard"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(router.app().region().markup().contains("visit 1"));
}
