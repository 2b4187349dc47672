//! Remote document store mirroring the shared state per user.
//!
//! Layout per user: one profile document plus one subcollection per record category.
//! Subcollections are replaced in bulk (delete everything, insert the new batch) and
//! listed newest first by their `synced_at` stamp.

mod memory;
mod sync;

pub use memory::MemoryDocumentStore;
pub use sync::{OrCancelExt, RemoteSync};

use async_trait::async_trait;
use farm_domain::app_data::AppDataKey;
use farm_domain::records::FarmProfile;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;

#[farm_derive::farm_error]
pub enum RemoteError {
    #[error("Remote store unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Permission denied{}: {message}", format_context(.context))]
    PermissionDenied { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Remote document not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("'{key}' is not a record collection{}", format_context(.context))]
    InvalidCategory { key: AppDataKey, context: Option<Cow<'static, str>> },

    #[error("Remote operation cancelled{}", format_context(.context))]
    Cancelled { context: Option<Cow<'static, str>> },

    #[error("Remote payload error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal remote error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// One stored record of a subcollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub id: String,
    /// Milliseconds since the Unix epoch; unique within one bulk replace.
    pub synced_at: i64,
    pub data: Value,
}

/// Everything stored for one user, delivered whole on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub profile: Option<FarmProfile>,
    pub collections: FxHashMap<AppDataKey, Vec<RemoteDocument>>,
}

impl RemoteSnapshot {
    /// Documents of `key` in insertion order (oldest first).
    #[must_use]
    pub fn chronological(&self, key: AppDataKey) -> Vec<&RemoteDocument> {
        let mut docs: Vec<&RemoteDocument> =
            self.collections.get(&key).map(|docs| docs.iter().collect()).unwrap_or_default();
        docs.sort_by_key(|doc| doc.synced_at);
        docs
    }
}

/// Per-user document storage.
#[async_trait]
pub trait RemoteStore: Send + Sync + Debug {
    async fn get_profile(&self, user: &str) -> Result<Option<FarmProfile>, RemoteError>;

    async fn set_profile(&self, user: &str, profile: &FarmProfile) -> Result<(), RemoteError>;

    /// Deletes every document of `key` and inserts `records`; returns how many were written.
    async fn replace_collection(
        &self,
        user: &str,
        key: AppDataKey,
        records: Vec<Value>,
    ) -> Result<usize, RemoteError>;

    /// Documents of `key`, newest `synced_at` first.
    async fn list_collection(
        &self,
        user: &str,
        key: AppDataKey,
    ) -> Result<Vec<RemoteDocument>, RemoteError>;

    /// Live view of the user's documents; the current value is available immediately.
    fn subscribe(&self, user: &str) -> watch::Receiver<Arc<RemoteSnapshot>>;
}
