use anyhow::Context;
use farm::domain::config::AppConfig;
use farm::kernel::config::load_config;
use farm::kernel::events::{EventBus, EventReceiverExt};
use farm::kernel::prelude::*;
use farm::kernel::storage::{Compression, LocalStore};
use farm_logger::{ConsoleFormat, LevelFilter, Logger};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// Boots the UI core, restores local data and renders the default module followed by
/// every module named on the command line.
#[farm_runtime::main(event_loop)]
async fn main() -> anyhow::Result<()> {
    let loaded = load_config::<AppConfig>("farmhub");
    let config = loaded.as_ref().map_or_else(|_| AppConfig::default(), Clone::clone);
    let _log = init_logger(&config)?;
    if let Err(error) = &loaded {
        warn!(%error, "No usable farmhub config, running with defaults");
    }

    let compression = if config.storage.compression { Compression::Lz4 } else { Compression::None };
    let store = LocalStore::builder()
        .root(&config.storage.data_dir)
        .compression(compression)
        .open()
        .await
        .context("Critical: local data directory is unusable")?;

    let events = EventBus::new();
    let mut notifications = events.subscribe::<Notification>()?;
    let state = AppState::new(Some(store), events);
    let outcome = state.restore().await;
    info!(?outcome, "Local data loaded");

    let mut builder = AppContext::builder().config(config.clone()).state(state);
    if config.remote.enabled {
        builder = builder.remote(Arc::new(MemoryDocumentStore::new()));
    }
    let app = builder.build()?;
    app.restore_session().await;
    farm::register_all(app.registry())?;

    let mut router = Router::new(app.clone());
    farm::install_navigation(&mut router);

    let mut stdout = std::io::stdout().lock();
    let targets = std::iter::once(config.router.default_module.clone()).chain(std::env::args().skip(1));
    for target in targets {
        if let Err(error) = router.navigate_to(&target) {
            warn!(%error, "Navigation did not complete");
        }
        writeln!(stdout, "<!-- {target} -->\n{}", app.region().markup())?;
    }

    if let Some(sync) = app.remote_sync() {
        let token = CancellationToken::new();
        match sync.push_all(&token).await {
            Ok(written) => info!(written, user = sync.user(), "Remote copy refreshed"),
            Err(error) => app.notify(NotificationLevel::Warning, format!("Sync failed: {error}"), None),
        }
    }

    for note in notifications.drain() {
        warn!(level = ?note.level, module = ?note.module, "{}", note.message);
    }

    router.shutdown();
    Ok(())
}

fn init_logger(config: &AppConfig) -> anyhow::Result<Logger> {
    let level = config.logging.level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let console = if config.logging.json { ConsoleFormat::Json } else { ConsoleFormat::Compact };

    let builder = Logger::builder().name(env!("CARGO_BIN_NAME")).level(level).console(console);
    let logger = match &config.logging.directory {
        Some(directory) => builder.file(directory).init(),
        None => builder.init(),
    };
    Ok(logger?)
}
