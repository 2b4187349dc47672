//! The [`LocalStore`] handle: a string key-value store backed by one file per key.

use crate::builder::LocalStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::key::StorageKey;
use crate::maintenance::{self, TMP_MARKER};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn encode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decode(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(&data).context("Lz4 decompression failed")
            },
        }
    }
}

#[derive(Debug)]
pub(crate) struct LocalStoreInner {
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    pub(crate) tmp_counter: AtomicU64,
}

/// A persistent key-value store with `localStorage` semantics.
///
/// Values are UTF-8 strings (callers store JSON). Each key lives in its own file under the
/// store root and is replaced atomically: the value goes to a unique temp file, is synced,
/// then renamed over the previous one. Reading a missing key is not an error.
///
/// The handle is reference counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use farm_storage::{LocalStore, StorageError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let store = LocalStore::builder().root(tmp.path().join("local")).open().await?;
///
///     store.set_item("appData", r#"{"sales":[]}"#).await?;
///     assert_eq!(store.get_item("appData").await?.as_deref(), Some(r#"{"sales":[]}"#));
///     assert_eq!(store.get_item("missing").await?, None);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    pub(crate) inner: Arc<LocalStoreInner>,
}

impl LocalStore {
    #[must_use = "The store is not opened until you call .open()"]
    pub fn builder() -> LocalStoreBuilder {
        LocalStoreBuilder::new()
    }

    /// The canonical directory holding the values.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    fn path_of(&self, key: &StorageKey) -> PathBuf {
        self.inner.root.join(key.file_name())
    }

    /// Reads the value stored under `key`, `None` when absent.
    ///
    /// # Errors
    /// [`StorageError::InvalidKey`] for a malformed key, [`StorageError::Io`] on read failure,
    /// [`StorageError::Decompress`]/[`StorageError::Encoding`] for undecodable content.
    pub async fn get_item<K>(&self, key: K) -> Result<Option<String>, StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let key = key.try_into()?;
        let path = self.path_of(&key);

        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        let bytes = self.inner.compression.decode(raw)?;
        let value = String::from_utf8(bytes).context(format!("Value of '{key}'"))?;
        Ok(Some(value))
    }

    /// Stores `value` under `key`, replacing any previous value atomically.
    ///
    /// # Errors
    /// [`StorageError::InvalidKey`] for a malformed key, [`StorageError::Io`] when the temp
    /// file cannot be written or swapped into place.
    pub async fn set_item<K>(&self, key: K, value: &str) -> Result<(), StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let key = key.try_into()?;
        let target = self.path_of(&key);
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let temp = self.inner.root.join(format!("{}{TMP_MARKER}{n}", key.file_name()));

        let payload = self.inner.compression.encode(value.as_bytes());
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&payload).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &target).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(StorageError::Io {
                source: err,
                context: Some(format!("Atomic swap failed for '{key}'").into()),
            });
        }

        debug!(key = %key, bytes = payload.len(), "Value stored");
        Ok(())
    }

    /// Removes `key`. Returns whether a value existed.
    ///
    /// # Errors
    /// [`StorageError::InvalidKey`] for a malformed key, [`StorageError::Io`] on failure.
    pub async fn remove_item<K>(&self, key: K) -> Result<bool, StorageError>
    where
        K: TryInto<StorageKey, Error = StorageError>,
    {
        let key = key.try_into()?;
        match fs::remove_file(self.path_of(&key)).await {
            Ok(()) => {
                debug!(key = %key, "Value removed");
                Ok(true)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to remove '{key}'").into()),
            }),
        }
    }

    /// Lists stored keys in lexicographic order.
    ///
    /// # Errors
    /// [`StorageError::Io`] when the root cannot be listed.
    pub async fn keys(&self) -> Result<Vec<StorageKey>, StorageError> {
        let mut entries = fs::read_dir(&self.inner.root).await.context("Listing store root")?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.context("Listing store root")? {
            if let Some(key) = entry.file_name().to_str().and_then(StorageKey::from_file_name) {
                keys.push(key);
            }
        }
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(keys)
    }

    /// Removes every stored key.
    ///
    /// # Errors
    /// Propagates the first listing or removal failure.
    pub async fn clear(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for key in self.keys().await? {
            if self.remove_item(key.as_str()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub(crate) async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root).await;
    }
}
