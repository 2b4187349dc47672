//! Well-known names shared across crates.

/// Conventional suffix a module name may carry (`"sales.js"` resolves like `"sales"`).
pub const MODULE_SUFFIX: &str = ".js";

// Module names.
pub const AUTH: &str = "auth";
pub const DASHBOARD: &str = "dashboard";
pub const FEED_RECORD: &str = "feed-record";
pub const MORTALITY: &str = "mortality";
pub const PROFILE: &str = "profile";
pub const SALES: &str = "sales";

/// Module shown after start-up and by "go to default module".
pub const DEFAULT_MODULE: &str = DASHBOARD;

// Local storage keys. `appData` holds the full snapshot; the others are per-collection
// keys kept readable for data written before the snapshot existed.
pub const APP_DATA_KEY: &str = "appData";
pub const PROFILE_KEY: &str = "farmProfile";
pub const INVENTORY_KEY: &str = "inventory";
pub const TRANSACTIONS_KEY: &str = "transactions";
pub const SALES_KEY: &str = "salesRecords";
pub const FEED_RECORDS_KEY: &str = "feedRecords";
pub const MORTALITY_KEY: &str = "mortalityRecords";
pub const SETTINGS_KEY: &str = "settings";
/// Signed-in user id of the current session.
pub const SESSION_KEY: &str = "session";
