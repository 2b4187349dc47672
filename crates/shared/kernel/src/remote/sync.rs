use super::{RemoteError, RemoteSnapshot, RemoteStore};
use crate::state::{AppState, field_value};
use async_trait::async_trait;
use farm_domain::app_data::AppDataKey;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Races a future against a [`CancellationToken`].
#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// `Err(RemoteError::Cancelled)` when `token` fires first.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, RemoteError>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, RemoteError> {
        tokio::select! {
            () = token.cancelled() => Err(RemoteError::Cancelled { context: None }),
            res = self => Ok(res),
        }
    }
}

/// Mirrors [`AppState`] to a [`RemoteStore`] for one user.
///
/// Settings stay local; the profile and every record collection are mirrored. Pushes,
/// pulls and watchers of the same state take turns, so a watcher never applies the
/// half-written remote copy of a push in flight.
#[derive(Debug, Clone)]
pub struct RemoteSync {
    state: AppState,
    remote: Arc<dyn RemoteStore>,
    user: String,
}

impl RemoteSync {
    #[must_use]
    pub fn new(state: AppState, remote: Arc<dyn RemoteStore>, user: impl Into<String>) -> Self {
        Self { state, remote, user: user.into() }
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Uploads the profile and replaces every remote collection with the local one.
    /// Returns the number of records written.
    ///
    /// Everything uploaded comes from one snapshot taken when the push starts.
    pub async fn push_all(&self, token: &CancellationToken) -> Result<usize, RemoteError> {
        let _turn = self.state.sync_gate().lock().or_cancel(token).await?;
        let data = self.state.snapshot();
        self.remote.set_profile(&self.user, &data.profile).or_cancel(token).await??;

        let mut written = 0;
        for key in collection_keys() {
            let Value::Array(records) = field_value(&data, key).map_err(internal)? else {
                continue;
            };
            written += self
                .remote
                .replace_collection(&self.user, key, records)
                .or_cancel(token)
                .await??;
        }

        info!(user = %self.user, written, "Local data pushed to remote store");
        Ok(written)
    }

    /// Replaces local collections (and the profile, when one is stored) with the remote
    /// copies, then persists. Returns the number of records pulled.
    pub async fn pull_all(&self, token: &CancellationToken) -> Result<usize, RemoteError> {
        let turn = self.state.sync_gate().lock().or_cancel(token).await?;
        let mut patch = Map::new();
        if let Some(profile) = self.remote.get_profile(&self.user).or_cancel(token).await?? {
            patch.insert(AppDataKey::Profile.as_str().to_owned(), serde_json::to_value(profile)?);
        }

        let mut pulled = 0;
        for key in collection_keys() {
            let documents = self.remote.list_collection(&self.user, key).or_cancel(token).await??;
            pulled += documents.len();
            // Listing is newest first; local collections keep insertion order.
            let records: Vec<Value> = documents.into_iter().rev().map(|doc| doc.data).collect();
            patch.insert(key.as_str().to_owned(), Value::Array(records));
        }

        self.state.merge_fields(patch).map_err(internal)?;
        drop(turn);
        self.state.persist().await;
        info!(user = %self.user, pulled, "Remote data pulled");
        Ok(pulled)
    }

    /// Applies every remote snapshot to the local state until `token` is cancelled.
    pub fn watch(&self, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.remote.subscribe(&self.user);
        let state = self.state.clone();
        let user = self.user.clone();

        tokio::spawn(async move {
            debug!(%user, "Watching remote snapshots");
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            warn!(%user, "Remote subscription closed");
                            break;
                        }
                        // Waits out a push in flight, then applies only the latest snapshot.
                        let Ok(turn) = state.sync_gate().lock().or_cancel(&token).await else {
                            break;
                        };
                        let snapshot = Arc::clone(&rx.borrow_and_update());
                        let applied = apply_snapshot(&state, &snapshot);
                        drop(turn);
                        match applied {
                            Ok(()) => {
                                state.persist().await;
                            },
                            Err(error) => warn!(%user, %error, "Ignoring remote snapshot"),
                        }
                    },
                }
            }
            debug!(%user, "Stopped watching remote snapshots");
        })
    }
}

fn collection_keys() -> impl Iterator<Item = AppDataKey> {
    AppDataKey::ALL.into_iter().filter(|key| key.is_collection())
}

fn internal(error: impl std::fmt::Display) -> RemoteError {
    RemoteError::Internal { message: error.to_string().into(), context: None }
}

fn apply_snapshot(state: &AppState, snapshot: &RemoteSnapshot) -> Result<(), RemoteError> {
    let mut patch = Map::new();
    if let Some(profile) = &snapshot.profile {
        patch.insert(AppDataKey::Profile.as_str().to_owned(), serde_json::to_value(profile)?);
    }
    for key in collection_keys().filter(|key| snapshot.collections.contains_key(key)) {
        let records = snapshot.chronological(key).into_iter().map(|doc| doc.data.clone()).collect();
        patch.insert(key.as_str().to_owned(), Value::Array(records));
    }
    if patch.is_empty() {
        return Ok(());
    }
    state.merge_fields(patch).map_err(internal)
}
