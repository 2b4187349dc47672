//! Name-to-descriptor lookup for UI modules.

use crate::module::ModuleDescriptor;
use farm_domain::constants::MODULE_SUFFIX;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};

#[farm_derive::farm_error]
pub enum RegistryError {
    #[error("Invalid module name{}: '{name}'", format_context(.context))]
    InvalidName { name: String, context: Option<Cow<'static, str>> },

    #[error("Module '{name}' provides neither a template nor an initializer{}", format_context(.context))]
    Unusable { name: String, context: Option<Cow<'static, str>> },

    #[error("Module '{name}' is already registered{}", format_context(.context))]
    AlreadyRegistered { name: String, context: Option<Cow<'static, str>> },
}

/// Canonical form of a module name: trimmed, without the conventional `.js` suffix,
/// lowercase. Registration and lookup both go through here.
///
/// ```rust
/// use farm_kernel::registry::canonicalize;
///
/// assert_eq!(canonicalize(" Feed-Record.JS "), "feed-record");
/// assert_eq!(canonicalize("sales"), "sales");
/// ```
#[must_use]
pub fn canonicalize(name: &str) -> String {
    let trimmed = name.trim();
    let split = trimmed.len().saturating_sub(MODULE_SUFFIX.len());
    let stem = match trimmed.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(MODULE_SUFFIX) => &trimmed[..split],
        _ => trimmed,
    };
    stem.trim().to_lowercase()
}

/// Registry of UI modules, keyed by canonical name.
///
/// Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Arc<RwLock<FxHashMap<String, Arc<ModuleDescriptor>>>>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `descriptor` under its canonical name.
    ///
    /// The first registration of a name wins; later ones are rejected and leave the
    /// existing descriptor in place.
    pub fn register(&self, descriptor: ModuleDescriptor) -> Result<(), RegistryError> {
        let name = canonicalize(descriptor.name());
        if name.is_empty() {
            return Err(RegistryError::InvalidName { name: descriptor.name().to_owned(), context: None });
        }
        if !descriptor.capabilities().is_usable() {
            return Err(RegistryError::Unusable { name, context: None });
        }

        let mut modules = self.modules.write();
        if modules.contains_key(&name) {
            warn!(module = %name, "Duplicate module registration ignored");
            return Err(RegistryError::AlreadyRegistered { name, context: None });
        }

        debug!(module = %name, capabilities = ?descriptor.capabilities(), "Module registered");
        modules.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Resolves `name` in any letter case, with or without the `.js` suffix.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<ModuleDescriptor>> {
        self.modules.read().get(&canonicalize(name)).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(&canonicalize(name))
    }

    /// Canonical names in lexicographic order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}
