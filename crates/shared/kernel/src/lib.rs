//! Kernel of the FarmHub UI core.
//!
//! * [`registry::ModuleRegistry`] resolves module names to descriptors.
//! * [`router::Router`] drives the single content region between modules.
//! * [`state::AppState`] owns the shared farm data and its local persistence.
//! * [`remote`] mirrors that data to a remote document store.
//! * [`context::AppContext`] bundles all of the above and is injected into every module.
//!
//! ## ID generation
//! Use `safe_nanoid!` for record ids without visually ambiguous characters:
//! ```rust
//! # use farm_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
pub mod config;
pub mod context;
pub mod module;
pub mod prelude;
pub mod region;
pub mod registry;
pub mod remote;
pub mod router;
pub mod state;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use farm_domain as domain;
pub use farm_event_bus as events;
pub use farm_storage as storage;
pub use nanoid::nanoid;
pub use tokio_util::sync::CancellationToken;

/// Today's date (UTC) as an ISO-8601 `YYYY-MM-DD` string, the format records carry.
#[must_use]
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
