//! Shared application state and its local persistence.

use farm_domain::app_data::{AppDataKey, SharedAppData};
use farm_domain::constants::APP_DATA_KEY;
use farm_event_bus::EventBus;
use farm_storage::{LocalStore, StorageError};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[farm_derive::farm_error]
pub enum StateError {
    #[error("Invalid value for field{}: {message}", format_context(.context))]
    InvalidField { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown field{}: {message}", format_context(.context))]
    UnknownField { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("State serialization failed{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("State storage failed{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

/// Published after every mutation. `key` is `None` when the whole snapshot may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub key: Option<AppDataKey>,
}

/// Result of [`AppState::persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved { bytes: usize },
    /// No local store is attached.
    Detached,
    /// The write failed; the failure was logged and the in-memory state is unaffected.
    Failed,
}

/// Result of [`AppState::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The umbrella snapshot replaced the in-memory data.
    Snapshot,
    /// The snapshot was missing or unreadable; these fields came from per-key storage.
    Legacy(Vec<AppDataKey>),
    /// Nothing usable was stored; the in-memory data is unchanged.
    Untouched,
}

#[derive(Debug)]
struct StateInner {
    data: RwLock<SharedAppData>,
    store: Option<LocalStore>,
    events: EventBus,
    // Held from serialization until the write lands, so writes reach disk in snapshot order.
    persist_lock: Mutex<()>,
    // Held by remote sync while it reads or writes the remote copy.
    sync_gate: Mutex<()>,
}

/// Handle to the shared farm data. Cloning shares the same data.
///
/// Mutations are last-writer-wins and publish [`StateChanged`]; they do not persist on
/// their own, callers decide when to [`AppState::persist`].
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Option<LocalStore>, events: EventBus) -> Self {
        Self {
            inner: Arc::new(StateInner {
                data: RwLock::new(SharedAppData::default()),
                store,
                events,
                persist_lock: Mutex::new(()),
                sync_gate: Mutex::new(()),
            }),
        }
    }

    /// State without local storage and with a private event bus.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(None, EventBus::new())
    }

    #[must_use]
    pub fn store(&self) -> Option<&LocalStore> {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Runs `f` against the current data under a read lock.
    pub fn read<R>(&self, f: impl FnOnce(&SharedAppData) -> R) -> R {
        f(&self.inner.data.read())
    }

    /// Mutates the data in place under a write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut SharedAppData) -> R) -> R {
        let result = f(&mut self.inner.data.write());
        self.changed(None);
        result
    }

    #[must_use]
    pub fn snapshot(&self) -> SharedAppData {
        self.inner.data.read().clone()
    }

    /// Replaces the whole snapshot.
    pub fn replace(&self, data: SharedAppData) {
        *self.inner.data.write() = data;
        self.changed(None);
    }

    /// JSON value of one top-level field.
    pub fn get_field(&self, key: AppDataKey) -> Result<Value, StateError> {
        field_value(&self.inner.data.read(), key)
    }

    /// Replaces one top-level field. A value of the wrong shape is rejected and the
    /// state is left as it was.
    pub fn set_field(&self, key: AppDataKey, value: Value) -> Result<(), StateError> {
        {
            let mut data = self.inner.data.write();
            assign(&mut data, key, value)?;
        }
        self.changed(Some(key));
        Ok(())
    }

    /// Applies several top-level fields at once; either all apply or none do.
    pub fn merge_fields(&self, patch: Map<String, Value>) -> Result<(), StateError> {
        let mut fields = Vec::with_capacity(patch.len());
        for (name, value) in patch {
            let key = name.parse::<AppDataKey>().map_err(|e| StateError::UnknownField {
                message: e.to_string().into(),
                context: None,
            })?;
            fields.push((key, value));
        }

        {
            let mut data = self.inner.data.write();
            let mut staged = data.clone();
            for (key, value) in fields {
                assign(&mut staged, key, value)?;
            }
            *data = staged;
        }
        self.changed(None);
        Ok(())
    }

    /// Writes the snapshot under the umbrella key. Failures are logged, never returned.
    ///
    /// Overlapping calls are queued: each serializes only once the previous write has
    /// landed, so the stored snapshot is never older than one taken by a later call.
    pub async fn persist(&self) -> PersistOutcome {
        let Some(store) = self.store() else {
            return PersistOutcome::Detached;
        };

        let _queued = self.inner.persist_lock.lock().await;
        let serialized = serde_json::to_string(&*self.inner.data.read());
        let json = match serialized {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "Failed to serialize app data");
                return PersistOutcome::Failed;
            },
        };

        match store.set_item(APP_DATA_KEY, &json).await {
            Ok(()) => {
                debug!(bytes = json.len(), "App data persisted");
                PersistOutcome::Saved { bytes: json.len() }
            },
            Err(error) => {
                warn!(%error, "Failed to persist app data");
                PersistOutcome::Failed
            },
        }
    }

    /// Loads stored data into memory.
    ///
    /// The umbrella snapshot wins when it parses. Otherwise each field is read from its
    /// per-key location, skipping anything missing or malformed. Never fails; when
    /// nothing usable is found the in-memory data stays as it was.
    pub async fn restore(&self) -> RestoreOutcome {
        let Some(store) = self.store() else {
            return RestoreOutcome::Untouched;
        };

        match store.get_item(APP_DATA_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<SharedAppData>(&raw) {
                Ok(data) => {
                    self.replace(data);
                    info!("App data restored from snapshot");
                    return RestoreOutcome::Snapshot;
                },
                Err(error) => warn!(%error, "Stored app data is corrupt, trying per-key data"),
            },
            Ok(None) => debug!("No app data snapshot stored"),
            Err(error) => warn!(%error, "Failed to read app data snapshot"),
        }

        let mut staged = self.snapshot();
        let mut restored = Vec::new();
        for key in AppDataKey::ALL {
            let storage_key = key.legacy_storage_key();
            let raw = match store.get_item(storage_key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(error) => {
                    warn!(key = storage_key, %error, "Failed to read stored field");
                    continue;
                },
            };
            let applied = serde_json::from_str::<Value>(&raw)
                .context(storage_key)
                .and_then(|value| assign(&mut staged, key, value));
            match applied {
                Ok(()) => restored.push(key),
                Err(error) => warn!(key = storage_key, %error, "Ignoring malformed stored field"),
            }
        }

        if restored.is_empty() {
            warn!("No stored app data found, keeping defaults");
            return RestoreOutcome::Untouched;
        }

        self.replace(staged);
        info!(fields = ?restored, "App data restored from per-key storage");
        RestoreOutcome::Legacy(restored)
    }

    /// Serializes remote pushes, pulls and snapshot application for this state.
    pub(crate) fn sync_gate(&self) -> &Mutex<()> {
        &self.inner.sync_gate
    }

    fn changed(&self, key: Option<AppDataKey>) {
        if let Err(error) = self.inner.events.publish(StateChanged { key }) {
            debug!(%error, "State change not announced");
        }
    }
}

/// JSON value of one top-level field of `data`.
pub(crate) fn field_value(data: &SharedAppData, key: AppDataKey) -> Result<Value, StateError> {
    let value = match key {
        AppDataKey::Profile => serde_json::to_value(&data.profile),
        AppDataKey::Inventory => serde_json::to_value(&data.inventory),
        AppDataKey::Transactions => serde_json::to_value(&data.transactions),
        AppDataKey::Sales => serde_json::to_value(&data.sales),
        AppDataKey::FeedRecords => serde_json::to_value(&data.feed_records),
        AppDataKey::MortalityRecords => serde_json::to_value(&data.mortality_records),
        AppDataKey::Settings => serde_json::to_value(&data.settings),
    };
    value.context(format!("Reading '{key}'"))
}

fn assign(data: &mut SharedAppData, key: AppDataKey, value: Value) -> Result<(), StateError> {
    fn typed<T: serde::de::DeserializeOwned>(key: AppDataKey, value: Value) -> Result<T, StateError> {
        serde_json::from_value(value).map_err(|e| StateError::InvalidField {
            message: format!("'{key}': {e}").into(),
            context: None,
        })
    }

    match key {
        AppDataKey::Profile => data.profile = typed(key, value)?,
        AppDataKey::Inventory => data.inventory = typed(key, value)?,
        AppDataKey::Transactions => data.transactions = typed(key, value)?,
        AppDataKey::Sales => data.sales = typed(key, value)?,
        AppDataKey::FeedRecords => data.feed_records = typed(key, value)?,
        AppDataKey::MortalityRecords => data.mortality_records = typed(key, value)?,
        AppDataKey::Settings => data.settings = typed(key, value)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_event_bus::EventReceiverExt;
    use serde_json::json;

    #[test]
    fn set_field_rejects_wrong_shape() {
        let state = AppState::detached();
        state.set_field(AppDataKey::Sales, json!([{ "product": "eggs", "quantity": 3 }])).unwrap();

        let err = state.set_field(AppDataKey::Sales, json!({ "not": "a list" })).unwrap_err();
        assert!(matches!(err, StateError::InvalidField { .. }));
        assert_eq!(state.read(|d| d.sales.len()), 1);
    }

    #[test]
    fn get_field_uses_camel_case() {
        let state = AppState::detached();
        state.update(|d| d.profile.farm_name = "Green Acres".to_owned());
        let profile = state.get_field(AppDataKey::Profile).unwrap();
        assert_eq!(profile["farmName"], "Green Acres");
    }

    #[test]
    fn merge_is_all_or_nothing() {
        let state = AppState::detached();
        let patch = json!({
            "inventory": [{ "name": "maize" }],
            "settings": "broken"
        });
        let Value::Object(patch) = patch else { unreachable!() };
        assert!(state.merge_fields(patch).is_err());
        assert!(state.read(|d| d.inventory.is_empty()));

        let Value::Object(patch) = json!({ "bogus": [] }) else { unreachable!() };
        assert!(matches!(state.merge_fields(patch), Err(StateError::UnknownField { .. })));
    }

    #[tokio::test]
    async fn mutations_are_announced() {
        let state = AppState::detached();
        let mut rx = state.events().subscribe::<StateChanged>().unwrap();

        state.set_field(AppDataKey::FeedRecords, json!([])).unwrap();
        let event = rx.next_event().await.unwrap();
        assert_eq!(event.key, Some(AppDataKey::FeedRecords));
    }

    #[tokio::test]
    async fn detached_state_skips_storage() {
        let state = AppState::detached();
        assert_eq!(state.persist().await, PersistOutcome::Detached);
        assert_eq!(state.restore().await, RestoreOutcome::Untouched);
    }
}
