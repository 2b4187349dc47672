use super::{RemoteDocument, RemoteError, RemoteSnapshot, RemoteStore};
use crate::safe_nanoid;
use async_trait::async_trait;
use farm_domain::app_data::AppDataKey;
use farm_domain::records::FarmProfile;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

type Channel = watch::Sender<Arc<RemoteSnapshot>>;

#[derive(Debug, Default)]
struct MemoryInner {
    users: RwLock<FxHashMap<String, Channel>>,
    offline: AtomicBool,
    latency: Option<Duration>,
}

/// In-process [`RemoteStore`]. Can simulate network latency and an offline backend.
///
/// Cloning shares the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`. Only meaningful before the store is shared.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { inner: Arc::new(MemoryInner { latency: Some(latency), ..MemoryInner::default() }) }
    }

    /// While offline every call fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::Release);
    }

    async fn round_trip(&self, user: &str) -> Result<(), RemoteError> {
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
        if self.inner.offline.load(Ordering::Acquire) {
            return Err(RemoteError::Unavailable {
                message: "document store is offline".into(),
                context: None,
            });
        }
        if user.trim().is_empty() {
            return Err(RemoteError::PermissionDenied {
                message: "no signed-in user".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn current(&self, user: &str) -> Arc<RemoteSnapshot> {
        self.inner
            .users
            .read()
            .get(user)
            .map(|channel| Arc::clone(&channel.borrow()))
            .unwrap_or_default()
    }

    fn modify(&self, user: &str, f: impl FnOnce(&mut RemoteSnapshot)) {
        let mut users = self.inner.users.write();
        let channel = users
            .entry(user.to_owned())
            .or_insert_with(|| watch::channel(Arc::default()).0);
        let mut next = RemoteSnapshot::clone(&channel.borrow());
        f(&mut next);
        channel.send_replace(Arc::new(next));
    }
}

#[async_trait]
impl RemoteStore for MemoryDocumentStore {
    async fn get_profile(&self, user: &str) -> Result<Option<FarmProfile>, RemoteError> {
        self.round_trip(user).await?;
        Ok(self.current(user).profile.clone())
    }

    async fn set_profile(&self, user: &str, profile: &FarmProfile) -> Result<(), RemoteError> {
        self.round_trip(user).await?;
        self.modify(user, |snapshot| snapshot.profile = Some(profile.clone()));
        debug!(user, "Remote profile stored");
        Ok(())
    }

    async fn replace_collection(
        &self,
        user: &str,
        key: AppDataKey,
        records: Vec<Value>,
    ) -> Result<usize, RemoteError> {
        if !key.is_collection() {
            return Err(RemoteError::InvalidCategory { key, context: None });
        }
        self.round_trip(user).await?;

        let base = chrono::Utc::now().timestamp_millis();
        let documents: Vec<RemoteDocument> = records
            .into_iter()
            .zip(base..)
            .map(|(data, synced_at)| {
                let id = data
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map_or_else(|| safe_nanoid!(), str::to_owned);
                RemoteDocument { id, synced_at, data }
            })
            .collect();

        let written = documents.len();
        self.modify(user, |snapshot| {
            snapshot.collections.insert(key, documents);
        });
        debug!(user, %key, written, "Remote collection replaced");
        Ok(written)
    }

    async fn list_collection(
        &self,
        user: &str,
        key: AppDataKey,
    ) -> Result<Vec<RemoteDocument>, RemoteError> {
        if !key.is_collection() {
            return Err(RemoteError::InvalidCategory { key, context: None });
        }
        self.round_trip(user).await?;

        let mut documents = self.current(user).collections.get(&key).cloned().unwrap_or_default();
        documents.sort_by(|a, b| b.synced_at.cmp(&a.synced_at));
        Ok(documents)
    }

    fn subscribe(&self, user: &str) -> watch::Receiver<Arc<RemoteSnapshot>> {
        self.inner
            .users
            .write()
            .entry(user.to_owned())
            .or_insert_with(|| watch::channel(Arc::default()).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER: &str = "farmer-1";

    #[tokio::test]
    async fn replace_deletes_previous_batch() {
        let store = MemoryDocumentStore::new();
        store
            .replace_collection(USER, AppDataKey::Sales, vec![json!({"id": "a"}), json!({"id": "b"})])
            .await
            .unwrap();
        store.replace_collection(USER, AppDataKey::Sales, vec![json!({"id": "c"})]).await.unwrap();

        let docs = store.list_collection(USER, AppDataKey::Sales).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "c");
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = MemoryDocumentStore::new();
        let records = vec![json!({"id": "first"}), json!({"id": "second"}), json!({})];
        store.replace_collection(USER, AppDataKey::FeedRecords, records).await.unwrap();

        let docs = store.list_collection(USER, AppDataKey::FeedRecords).await.unwrap();
        assert_eq!(docs[1].id, "second");
        assert_eq!(docs[2].id, "first");
        assert_eq!(docs[0].id.len(), 12);
        assert!(docs.windows(2).all(|w| w[0].synced_at > w[1].synced_at));
    }

    #[tokio::test]
    async fn objects_are_not_collections() {
        let store = MemoryDocumentStore::new();
        let err = store.replace_collection(USER, AppDataKey::Settings, vec![]).await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidCategory { key: AppDataKey::Settings, .. }));
    }

    #[tokio::test]
    async fn offline_and_anonymous_calls_fail() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.get_profile("  ").await,
            Err(RemoteError::PermissionDenied { .. })
        ));

        store.set_offline(true);
        assert!(matches!(store.get_profile(USER).await, Err(RemoteError::Unavailable { .. })));
        store.set_offline(false);
        assert_eq!(store.get_profile(USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_see_full_snapshots() {
        let store = MemoryDocumentStore::new();
        let mut rx = store.subscribe(USER);
        assert!(rx.borrow().collections.is_empty());

        let profile = FarmProfile { farm_name: "Hilltop".to_owned(), ..FarmProfile::default() };
        store.set_profile(USER, &profile).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().profile.as_ref(), Some(&profile));

        store.replace_collection(USER, AppDataKey::Sales, vec![json!({"id": "s1"})]).await.unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.profile.as_ref(), Some(&profile));
        assert_eq!(snapshot.chronological(AppDataKey::Sales).len(), 1);
    }
}
