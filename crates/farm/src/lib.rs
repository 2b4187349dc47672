//! Facade crate for FarmHub.
//! Re-exports the domain and kernel and registers every feature module.
//! Keep this crate thin: it composes other crates, it does not implement business logic.

pub use farm_domain as domain;
pub use farm_kernel as kernel;

use farm_domain::constants::{AUTH, DASHBOARD, FEED_RECORD, MORTALITY, PROFILE, SALES};
use farm_kernel::module::ModuleDescriptor;
use farm_kernel::registry::{ModuleRegistry, RegistryError};
use farm_kernel::router::Router;
use tracing::info;

pub mod features {
    pub use farm_auth as auth;
    pub use farm_dashboard as dashboard;
    pub use farm_feed as feed;
    pub use farm_mortality as mortality;
    pub use farm_profile as profile;
    pub use farm_sales as sales;
}

/// Navigation menu in display order: `(target module, label)`. Auth is reached
/// through the session flow, not the menu.
pub const NAVIGATION: [(&str, &str); 5] = [
    (DASHBOARD, "Dashboard"),
    (PROFILE, "Farm Profile"),
    (FEED_RECORD, "Feed Records"),
    (SALES, "Sales"),
    (MORTALITY, "Mortality"),
];

/// Descriptors of every bundled module.
#[must_use]
pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![
        features::auth::descriptor(),
        features::dashboard::descriptor(),
        features::feed::descriptor(),
        features::mortality::descriptor(),
        features::profile::descriptor(),
        features::sales::descriptor(),
    ]
}

/// Registers every bundled module.
///
/// # Errors
/// Stops at the first rejected descriptor (e.g. a name registered earlier by the host).
pub fn register_all(registry: &ModuleRegistry) -> Result<(), RegistryError> {
    for descriptor in descriptors() {
        registry.register(descriptor)?;
    }
    info!(modules = registry.len(), "Feature modules registered");
    Ok(())
}

/// Fills the router's navigation menu from [`NAVIGATION`].
pub fn install_navigation(router: &mut Router) {
    for (target, label) in NAVIGATION {
        router.add_nav_item(target, label);
    }
}

/// Whether `name` refers to a bundled module that takes part in the sign-in flow.
#[must_use]
pub fn is_auth_route(name: &str) -> bool {
    farm_kernel::registry::canonicalize(name) == AUTH
}
