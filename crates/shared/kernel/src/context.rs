//! The application context injected into the router and every module.

use crate::region::{ContentRegion, MemoryRegion};
use crate::registry::ModuleRegistry;
use crate::remote::{RemoteStore, RemoteSync};
use crate::state::AppState;
use farm_domain::config::AppConfig;
use farm_domain::constants::SESSION_KEY;
use farm_event_bus::EventBus;
use farm_storage::StorageError;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[farm_derive::farm_error]
pub enum ContextError {
    #[error("Context validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Session storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// User-visible message raised by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub module: Option<String>,
}

#[derive(Debug)]
struct AppContextInner {
    config: AppConfig,
    registry: ModuleRegistry,
    state: AppState,
    region: Arc<dyn ContentRegion>,
    remote: Option<Arc<dyn RemoteStore>>,
    session: RwLock<Option<String>>,
}

/// Shared handles for one running application. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

impl AppContext {
    #[must_use]
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.inner.registry
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.inner.state
    }

    /// The bus shared with the state handle.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.inner.state.events()
    }

    #[must_use]
    pub fn region(&self) -> &Arc<dyn ContentRegion> {
        &self.inner.region
    }

    #[must_use]
    pub fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.inner.remote.as_ref()
    }

    /// Signed-in user, or the configured default owner.
    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.inner.session.read().clone().or_else(|| self.inner.config.remote.user_id.clone())
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.session.read().is_some()
    }

    /// Remote mirroring for the current user, when a remote store is attached.
    #[must_use]
    pub fn remote_sync(&self) -> Option<RemoteSync> {
        let remote = self.inner.remote.clone()?;
        let user = self.current_user()?;
        Some(RemoteSync::new(self.inner.state.clone(), remote, user))
    }

    /// Marks `user` as signed in and remembers it locally.
    pub async fn sign_in(&self, user: &str) -> Result<(), ContextError> {
        let user = user.trim();
        if user.is_empty() {
            return Err(ContextError::Validation {
                message: "user id cannot be empty".into(),
                context: None,
            });
        }
        if let Some(store) = self.inner.state.store() {
            store.set_item(SESSION_KEY, user).await.context("Saving session")?;
        }
        *self.inner.session.write() = Some(user.to_owned());
        info!(user, "Signed in");
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), ContextError> {
        if let Some(store) = self.inner.state.store() {
            store.remove_item(SESSION_KEY).await.context("Clearing session")?;
        }
        if let Some(user) = self.inner.session.write().take() {
            info!(%user, "Signed out");
        }
        Ok(())
    }

    /// Reloads a remembered session from local storage. Returns the user, if any.
    pub async fn restore_session(&self) -> Option<String> {
        let store = self.inner.state.store()?;
        match store.get_item(SESSION_KEY).await {
            Ok(Some(user)) if !user.trim().is_empty() => {
                *self.inner.session.write() = Some(user.clone());
                debug!(%user, "Session restored");
                Some(user)
            },
            Ok(_) => None,
            Err(error) => {
                warn!(%error, "Failed to read stored session");
                None
            },
        }
    }

    /// Publishes a [`Notification`]. Delivery problems are logged only.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>, module: Option<&str>) {
        let notification =
            Notification { level, message: message.into(), module: module.map(str::to_owned) };
        match level {
            NotificationLevel::Error => warn!(message = %notification.message, module, "Notification"),
            _ => debug!(message = %notification.message, module, "Notification"),
        }
        if let Err(error) = self.events().publish(notification) {
            debug!(%error, "Notification dropped");
        }
    }
}

#[derive(Debug, Default)]
pub struct AppContextBuilder {
    config: Option<AppConfig>,
    registry: Option<ModuleRegistry>,
    state: Option<AppState>,
    region: Option<Arc<dyn ContentRegion>>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl AppContextBuilder {
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn region(mut self, region: Arc<dyn ContentRegion>) -> Self {
        self.region = Some(region);
        self
    }

    #[must_use]
    pub fn remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn build(self) -> Result<AppContext, ContextError> {
        let state = self.state.ok_or_else(|| ContextError::Validation {
            message: "AppState not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();
        if config.router.default_module.trim().is_empty() {
            return Err(ContextError::Validation {
                message: "router.default_module cannot be empty".into(),
                context: None,
            });
        }

        Ok(AppContext {
            inner: Arc::new(AppContextInner {
                config,
                registry: self.registry.unwrap_or_default(),
                state,
                region: self.region.unwrap_or_else(|| Arc::new(MemoryRegion::new())),
                remote: self.remote,
                session: RwLock::new(None),
            }),
        })
    }
}
