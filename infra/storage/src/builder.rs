use crate::engine::{Compression, LocalStore, LocalStoreInner};
use crate::error::{StorageError, StorageErrorExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub trait Sealed {}
}
impl private::Sealed for NoRoot {}
impl private::Sealed for WithRoot {}

/// Fluent builder for [`LocalStore`]; a root directory is required before [`LocalStoreBuilder::open`].
#[derive(Debug)]
pub struct LocalStoreBuilder<S: private::Sealed = NoRoot> {
    state: S,
    compression: Compression,
    create: bool,
}

impl<S: private::Sealed> LocalStoreBuilder<S> {
    #[must_use = "Sets compression for stored values"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use = "Sets whether the root directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl Default for LocalStoreBuilder<NoRoot> {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStoreBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self { state: NoRoot, compression: Compression::None, create: true }
    }

    #[must_use = "Sets the root directory of the store"]
    pub fn root(self, path: impl Into<PathBuf>) -> LocalStoreBuilder<WithRoot> {
        LocalStoreBuilder { state: WithRoot(path.into()), compression: self.compression, create: self.create }
    }
}

impl LocalStoreBuilder<WithRoot> {
    /// Opens the store: creates the root when allowed, canonicalizes it and purges
    /// temp files orphaned by interrupted writes.
    ///
    /// # Errors
    /// [`StorageError::Io`] when the root is missing (and `create(false)`) or cannot be resolved.
    pub async fn open(self) -> Result<LocalStore, StorageError> {
        let root = self.state.0;

        if self.create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to create store root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve store root: {}", root.display()))?;
        info!(path = %canonical.display(), compression = ?self.compression, "Local store opened");

        let store = LocalStore {
            inner: Arc::new(LocalStoreInner {
                root: canonical,
                compression: self.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };
        store.purge_tmp().await;

        Ok(store)
    }
}
