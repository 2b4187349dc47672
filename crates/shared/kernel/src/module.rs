//! UI module descriptors and the context handed to their initialization hooks.

use crate::context::{AppContext, NotificationLevel};
use crate::region::ContentRegion;
use crate::remote::{RemoteError, RemoteStore};
use crate::state::{AppState, StateError};
use farm_domain::modules::ModuleCapabilities;
use farm_event_bus::EventBus;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Errors a module's initialization hook can report.
#[farm_derive::farm_error]
pub enum ModuleError {
    #[error("Module initialization failed{}: {message}", format_context(.context))]
    Initialization { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Shared state error{}: {source}", format_context(.context))]
    State { source: StateError, context: Option<Cow<'static, str>> },

    #[error("Remote store error{}: {source}", format_context(.context))]
    Remote { source: RemoteError, context: Option<Cow<'static, str>> },

    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Initialization hook of a module.
pub type InitHook = Arc<dyn Fn(&ModuleContext) -> Result<(), ModuleError> + Send + Sync>;

/// A registered UI module: markup, an initialization hook and capability flags.
///
/// Built with [`ModuleDescriptor::builder`]; the capabilities always reflect which
/// parts are present, so a descriptor cannot claim a template it does not have.
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    template: Option<Arc<str>>,
    initialize: Option<InitHook>,
    capabilities: ModuleCapabilities,
}

impl ModuleDescriptor {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder { name: name.into(), template: None, initialize: None, auth: false }
    }

    /// Name as given at construction (registration canonicalizes a copy).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    #[must_use]
    pub const fn capabilities(&self) -> ModuleCapabilities {
        self.capabilities
    }

    #[must_use]
    pub const fn is_auth_module(&self) -> bool {
        self.capabilities.contains(ModuleCapabilities::AUTH)
    }

    pub(crate) fn initialize_hook(&self) -> Option<&InitHook> {
        self.initialize.as_ref()
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("template_len", &self.template.as_ref().map(|t| t.len()))
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

pub struct ModuleDescriptorBuilder {
    name: String,
    template: Option<Arc<str>>,
    initialize: Option<InitHook>,
    auth: bool,
}

impl ModuleDescriptorBuilder {
    #[must_use]
    pub fn template(mut self, markup: impl Into<Arc<str>>) -> Self {
        self.template = Some(markup.into());
        self
    }

    #[must_use]
    pub fn initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ModuleContext) -> Result<(), ModuleError> + Send + Sync + 'static,
    {
        self.initialize = Some(Arc::new(hook));
        self
    }

    /// Marks the module as part of the authentication flow.
    #[must_use]
    pub const fn auth(mut self, is_auth_module: bool) -> Self {
        self.auth = is_auth_module;
        self
    }

    #[must_use]
    pub fn build(self) -> ModuleDescriptor {
        let mut capabilities = ModuleCapabilities::empty();
        capabilities.set(ModuleCapabilities::TEMPLATE, self.template.is_some());
        capabilities.set(ModuleCapabilities::INITIALIZE, self.initialize.is_some());
        capabilities.set(ModuleCapabilities::AUTH, self.auth);

        ModuleDescriptor {
            name: self.name,
            template: self.template,
            initialize: self.initialize,
            capabilities,
        }
    }
}

impl fmt::Debug for ModuleDescriptorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptorBuilder")
            .field("name", &self.name)
            .field("has_template", &self.template.is_some())
            .field("has_initialize", &self.initialize.is_some())
            .field("auth", &self.auth)
            .finish()
    }
}

/// What an initialization hook sees: the application context, the module's own
/// canonical name and a cancellation token that fires when the user navigates away.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    app: AppContext,
    module: Arc<str>,
    cancel: CancellationToken,
}

impl ModuleContext {
    pub(crate) const fn new(app: AppContext, module: Arc<str>, cancel: CancellationToken) -> Self {
        Self { app, module, cancel }
    }

    #[must_use]
    pub const fn app(&self) -> &AppContext {
        &self.app
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        self.app.state()
    }

    #[must_use]
    pub fn region(&self) -> &Arc<dyn ContentRegion> {
        self.app.region()
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Cancelled when the router leaves this module; race remote work against it.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.app.events()
    }

    #[must_use]
    pub fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.app.remote()
    }

    /// Replaces the content region's markup.
    pub fn render(&self, markup: impl Into<String>) {
        self.region().set_markup(markup.into());
    }

    /// Raises a notification attributed to this module.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.app.notify(level, message, Some(&*self.module));
    }
}
