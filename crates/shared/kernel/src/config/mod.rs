use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Custom error type for config loading.
#[farm_derive::farm_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration from a TOML file layered with environment overrides.
///
/// 1. **File**: `path` (extension optional, e.g. `"farmhub"` finds `farmhub.toml`).
/// 2. **Environment**: variables prefixed with `FARM__`, nested with double underscores
///    (`FARM__STORAGE__DATA_DIR` maps to `storage.data_dir`).
///
/// # Errors
/// Returns an error if the file is missing or the merged values do not fit `T`.
///
/// # Example
/// ```rust
/// use farm_kernel::config::load_config;
/// use farm_kernel::domain::config::AppConfig;
///
/// let cfg: AppConfig = load_config("does-not-exist").unwrap_or_default();
/// assert_eq!(cfg.router.default_module, "dashboard");
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    info!(path = %path.display(), "Loading config");

    Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(Environment::with_prefix("FARM").prefix_separator("__").separator("__"))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
