//! Navigation between modules.
//!
//! The router owns the content region on behalf of the active module. Every navigation
//! looks the module up again, swaps in its template and runs its initialization hook;
//! nothing is cached between visits. Failures never escape as panics: an unknown module
//! gets placeholder content and a failing hook gets an error panel with retry and
//! "back to start" actions.

use crate::context::AppContext;
use crate::module::ModuleContext;
use crate::region::{
    DEFAULT_ACTION, NAVIGATE_ACTION_PREFIX, RETRY_ACTION, placeholder_markup, render_error_panel,
};
use crate::registry::canonicalize;
use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[farm_derive::farm_error]
pub enum RouterError {
    #[error("Module '{name}' is not registered{}", format_context(.context))]
    ModuleNotFound { name: String, context: Option<Cow<'static, str>> },

    #[error("Module '{name}' failed to initialize{}: {message}", format_context(.context))]
    Initialization { name: String, message: String, context: Option<Cow<'static, str>> },

    #[error("No failed module to retry{}", format_context(.context))]
    NothingToRetry { context: Option<Cow<'static, str>> },

    #[error("Unknown action '{action}'{}", format_context(.context))]
    UnknownAction { action: String, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NotFound,
    Initialization(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RouteState {
    #[default]
    Idle,
    Active(String),
    Failed { name: String, reason: FailureReason },
}

/// Published after every navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChanged {
    pub module: String,
    pub state: RouteState,
}

/// Entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub target: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug)]
pub struct Router {
    app: AppContext,
    state: RouteState,
    nav: Vec<NavItem>,
    root: CancellationToken,
    current: Option<CancellationToken>,
}

impl Router {
    #[must_use]
    pub fn new(app: AppContext) -> Self {
        Self {
            app,
            state: RouteState::Idle,
            nav: Vec::new(),
            root: CancellationToken::new(),
            current: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RouteState {
        &self.state
    }

    #[must_use]
    pub fn active_module(&self) -> Option<&str> {
        match &self.state {
            RouteState::Active(name) => Some(name.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn add_nav_item(&mut self, target: impl Into<String>, label: impl Into<String>) {
        self.nav.push(NavItem { target: target.into(), label: label.into(), active: false });
    }

    #[must_use]
    pub fn nav_items(&self) -> &[NavItem] {
        &self.nav
    }

    /// Highlights the matching navigation entries and initializes `name`.
    pub fn navigate_to(&mut self, name: &str) -> Result<(), RouterError> {
        let target = canonicalize(name);
        for item in &mut self.nav {
            item.active = canonicalize(&item.target) == target;
        }
        debug!(module = %target, "Navigating");
        self.initialize_module(&target)
    }

    /// Renders `name` into the content region and runs its initialization hook.
    ///
    /// Work still running for the previous module is cancelled first.
    pub fn initialize_module(&mut self, name: &str) -> Result<(), RouterError> {
        let name = canonicalize(name);
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        let region = Arc::clone(self.app.region());

        let Some(descriptor) = self.app.registry().lookup(&name) else {
            warn!(module = %name, "Module not registered, showing placeholder");
            region.set_markup(placeholder_markup(&name));
            self.transition(RouteState::Failed { name: name.clone(), reason: FailureReason::NotFound });
            return Err(RouterError::ModuleNotFound { name, context: None });
        };

        if let Some(template) = descriptor.template() {
            region.set_markup(template.to_owned());
        }

        let Some(hook) = descriptor.initialize_hook() else {
            info!(module = %name, "Module rendered");
            self.transition(RouteState::Active(name));
            return Ok(());
        };

        let token = self.root.child_token();
        self.current = Some(token.clone());
        let ctx = ModuleContext::new(self.app.clone(), Arc::from(name.as_str()), token);

        let failure = match panic::catch_unwind(AssertUnwindSafe(|| hook(&ctx))) {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(error.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        match failure {
            None => {
                info!(module = %name, "Module initialized");
                self.transition(RouteState::Active(name));
                Ok(())
            },
            Some(message) => {
                warn!(module = %name, error = %message, "Module initialization failed");
                render_error_panel(region.as_ref(), &name, &message);
                self.transition(RouteState::Failed {
                    name: name.clone(),
                    reason: FailureReason::Initialization(message.clone()),
                });
                Err(RouterError::Initialization { name, message, context: None })
            },
        }
    }

    /// Initializes the failed module again.
    pub fn retry(&mut self) -> Result<(), RouterError> {
        let RouteState::Failed { name, .. } = &self.state else {
            return Err(RouterError::NothingToRetry { context: None });
        };
        let name = name.clone();
        info!(module = %name, "Retrying module");
        self.initialize_module(&name)
    }

    pub fn go_to_default(&mut self) -> Result<(), RouterError> {
        let default = self.app.config().router.default_module.clone();
        self.navigate_to(&default)
    }

    /// Runs a region action: `retry`, `default` or `navigate:<module>`.
    pub fn handle_action(&mut self, action: &str) -> Result<(), RouterError> {
        match action {
            RETRY_ACTION => self.retry(),
            DEFAULT_ACTION => self.go_to_default(),
            other => match other.strip_prefix(NAVIGATE_ACTION_PREFIX) {
                Some(target) => self.navigate_to(target),
                None => Err(RouterError::UnknownAction { action: other.to_owned(), context: None }),
            },
        }
    }

    /// Activates the element `element_id` of the current markup. Returns `Ok(false)` when
    /// nothing is bound to it.
    pub fn click(&mut self, element_id: &str) -> Result<bool, RouterError> {
        let Some(action) = self.app.region().action_for(element_id) else {
            return Ok(false);
        };
        self.handle_action(&action).map(|()| true)
    }

    /// Cancels any in-flight module work. Later navigations get already-cancelled tokens.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.current = None;
    }

    fn transition(&mut self, state: RouteState) {
        let module = match &state {
            RouteState::Idle => String::new(),
            RouteState::Active(name) | RouteState::Failed { name, .. } => name.clone(),
        };
        self.state = state.clone();
        if let Err(error) = self.app.events().publish(RouteChanged { module, state }) {
            debug!(%error, "Route change not announced");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "module panicked".to_owned())
}
