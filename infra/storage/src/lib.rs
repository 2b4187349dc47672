//! Local key-value storage for FarmHub.
//!
//! A durable stand-in for a browser's `localStorage`: string values under short string
//! keys, one file per key inside a sandboxed root directory.
//!
//! - **Validated keys**: [`StorageKey`] rejects separators, traversal and hidden names.
//! - **Atomic writes**: temp file, `fsync`, then rename over the previous value.
//! - **Self-healing**: stale temp files from interrupted writes are removed on open.
//! - **Optional LZ4** compression, invisible to callers.
//!
//! ```rust
//! use farm_storage::{Compression, LocalStore, StorageError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let store = LocalStore::builder()
//!         .root(tmp.path())
//!         .compression(Compression::Lz4)
//!         .open()
//!         .await?;
//!
//!     store.set_item("feedRecords", "[]").await?;
//!     assert_eq!(store.keys().await?.len(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod key;
mod maintenance;

pub use builder::LocalStoreBuilder;
pub use engine::{Compression, LocalStore};
pub use error::{StorageError, StorageErrorExt};
pub use key::StorageKey;
