use std::sync::Arc;

use chrono::{DateTime, Utc};
use github_store::{ContentsError, FileSha};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::instrument;

use crate::domain::{migrate_bundle, models::StateBundle, now_iso, AppStore};
use crate::repositories::{CacheError, LocalCacheRepository};

use super::RemoteStore;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] ContentsError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("no remote document and no local snapshot")]
    NothingToLoad,
    #[error("malformed state document: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Synced,
    Error,
}

/// Snapshot of the orchestrator surfaced to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    pub remote_enabled: bool,
}

#[derive(Debug, Clone)]
pub enum SyncMessage {
    Push,
}

/// Decides where state comes from on startup and pushes it out on every
/// mutation.
///
/// State machine: `idle -> syncing -> {synced, error}`, and back to
/// `syncing` on the next trigger. Pushes are serialized by the run loop;
/// a failed push is only retried by the next mutation or a manual sync.
pub struct SyncOrchestrator {
    store: Arc<AppStore>,
    cache: LocalCacheRepository,
    remote: Option<Arc<dyn RemoteStore>>,
    data_path: String,
    status: Arc<RwLock<SyncStatus>>,
    last_error: Arc<RwLock<Option<String>>>,
    last_synced: Arc<RwLock<Option<DateTime<Utc>>>>,
    remote_sha: Arc<RwLock<Option<FileSha>>>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<AppStore>,
        cache: LocalCacheRepository,
        remote: Option<Arc<dyn RemoteStore>>,
        data_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            remote,
            data_path: data_path.into(),
            status: Arc::new(RwLock::new(SyncStatus::Idle)),
            last_error: Arc::new(RwLock::new(None)),
            last_synced: Arc::new(RwLock::new(None)),
            remote_sha: Arc::new(RwLock::new(None)),
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn status(&self) -> SyncStatus {
        *self.status.read().await
    }

    pub async fn state(&self) -> SyncState {
        SyncState {
            status: *self.status.read().await,
            error: self.last_error.read().await.clone(),
            last_synced: *self.last_synced.read().await,
            remote_enabled: self.remote_enabled(),
        }
    }

    /// Loads the initial state: remote first, local cache as fallback.
    /// Adopted state does not trigger a push back out.
    #[instrument(name = "SyncOrchestrator::bootstrap", skip(self))]
    pub async fn bootstrap(&self) {
        self.enter_syncing().await;

        if let Some(remote) = &self.remote {
            match remote.get(&self.data_path).await {
                Ok(Some(file)) => {
                    let mut value = file.value;
                    migrate_bundle(&mut value);
                    match serde_json::from_value::<StateBundle>(value) {
                        Ok(bundle) => {
                            if let Err(e) = self.cache.write_bundle(&bundle) {
                                tracing::warn!("local cache write failed: {}", e);
                            }
                            self.store.adopt(bundle).await;
                            self.remote_sha.write().await.replace(file.sha);
                            self.mark_synced().await;
                            return;
                        }
                        Err(e) => {
                            tracing::warn!("remote document malformed, using local cache: {}", e);
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("no remote document yet, using local cache");
                }
                Err(e) => {
                    tracing::warn!("remote load failed, using local cache: {}", e);
                }
            }
        }

        match self.cache.read_bundle() {
            Ok(Some(bundle)) => {
                self.store.adopt(bundle).await;
                self.mark_synced().await;
            }
            Ok(None) => {
                self.mark_error(SyncError::NothingToLoad.to_string()).await;
            }
            Err(e) => {
                self.mark_error(e.to_string()).await;
            }
        }
    }

    /// Reacts to the store's change feed and to manual sync requests until
    /// the feed closes. Each trigger results in at most one push; rapid
    /// commits coalesce.
    pub async fn run(&self, mut messages: mpsc::Receiver<SyncMessage>) {
        let mut changes = self.store.subscribe();

        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    changes.borrow_and_update();
                    if let Err(e) = self.push().await {
                        tracing::error!("push failed: {}", e);
                    }
                }
                message = messages.recv() => {
                    match message {
                        Some(SyncMessage::Push) => {
                            if let Err(e) = self.push().await {
                                tracing::error!("manual sync failed: {}", e);
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    }

    /// Writes the current state through to the local cache, then pushes it
    /// to the remote with the last known version token as precondition.
    ///
    /// A conflict (out-of-band writer) marks `error` and leaves the token
    /// bookkeeping untouched; nothing is merged automatically.
    #[instrument(name = "SyncOrchestrator::push", skip(self))]
    pub async fn push(&self) -> Result<(), SyncError> {
        let mut bundle = self.store.snapshot().await;
        bundle.export_date = Some(now_iso());

        if let Err(e) = self.cache.write_bundle(&bundle) {
            tracing::warn!("local cache write failed: {}", e);
        }

        let Some(remote) = &self.remote else {
            return Ok(());
        };

        self.enter_syncing().await;

        let sha = match self.precondition_sha(remote.as_ref()).await {
            Ok(sha) => sha,
            Err(e) => {
                self.mark_error(e.to_string()).await;
                return Err(e.into());
            }
        };

        let value =
            serde_json::to_value(&bundle).map_err(|e| SyncError::Malformed(e.to_string()))?;
        let message = format!("chore: save app data ({})", now_iso());

        match remote.put(&self.data_path, &value, &message, sha.as_ref()).await {
            Ok(new_sha) => {
                self.remote_sha.write().await.replace(new_sha);
                self.mark_synced().await;
                Ok(())
            }
            Err(e) => {
                self.mark_error(e.to_string()).await;
                Err(e.into())
            }
        }
    }

    /// The last token we obtained, or a fresh read of the remote's token
    /// when we never fetched one (e.g. bootstrap fell back to the cache).
    async fn precondition_sha(
        &self,
        remote: &dyn RemoteStore,
    ) -> Result<Option<FileSha>, ContentsError> {
        if let Some(sha) = self.remote_sha.read().await.clone() {
            return Ok(Some(sha));
        }
        remote.get_sha(&self.data_path).await
    }

    async fn enter_syncing(&self) {
        *self.status.write().await = SyncStatus::Syncing;
        self.last_error.write().await.take();
    }

    async fn mark_synced(&self) {
        *self.status.write().await = SyncStatus::Synced;
        self.last_synced.write().await.replace(Utc::now());
    }

    async fn mark_error(&self, message: String) {
        tracing::warn!("sync error: {}", message);
        *self.status.write().await = SyncStatus::Error;
        self.last_error.write().await.replace(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Project;
    use crate::domain::sync::MockRemoteStore;
    use serde_json::json;

    const DATA_PATH: &str = "data/app-state.json";

    fn orchestrator(
        remote: Option<MockRemoteStore>,
        cache_dir: &std::path::Path,
    ) -> (Arc<AppStore>, SyncOrchestrator) {
        let store = Arc::new(AppStore::new(StateBundle::default()));
        let cache = LocalCacheRepository::new(cache_dir);
        let remote = remote.map(|r| Arc::new(r) as Arc<dyn RemoteStore>);
        let orchestrator = SyncOrchestrator::new(store.clone(), cache, remote, DATA_PATH);
        (store, orchestrator)
    }

    #[tokio::test]
    async fn bootstrap_adopts_and_migrates_remote_document() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MockRemoteStore::new().with_file(
            DATA_PATH,
            json!({
                "projects": [{"id": "1", "name": "Кула А", "investor": {"name": "Инвест ДОО"}}],
                "architects": [],
                "contractors": []
            }),
        );
        let (store, orchestrator) = orchestrator(Some(remote), dir.path());

        orchestrator.bootstrap().await;

        assert_eq!(orchestrator.status().await, SyncStatus::Synced);
        let state = store.snapshot().await;
        assert_eq!(state.projects[0].investors[0].name, "Инвест ДОО");
        // Written through to the local cache for offline fallback.
        let cached = LocalCacheRepository::new(dir.path()).read_bundle().unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn bootstrap_falls_back_to_cache_on_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCacheRepository::new(dir.path());
        cache
            .write_bundle(&StateBundle {
                projects: vec![Project {
                    id: "1".to_string(),
                    name: "Офлајн проект".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap();

        let (store, orchestrator) = orchestrator(Some(MockRemoteStore::new()), dir.path());
        orchestrator.bootstrap().await;

        assert_eq!(orchestrator.status().await, SyncStatus::Synced);
        assert_eq!(store.snapshot().await.projects.len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_errors_when_remote_and_cache_are_both_absent() {
        let dir = tempfile::tempdir().unwrap();
        let (_, orchestrator) = orchestrator(Some(MockRemoteStore::new()), dir.path());

        orchestrator.bootstrap().await;

        let state = orchestrator.state().await;
        assert_eq!(state.status, SyncStatus::Error);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn bootstrap_falls_back_to_cache_on_network_failure() {
        let dir = tempfile::tempdir().unwrap();
        LocalCacheRepository::new(dir.path())
            .write_bundle(&StateBundle::default())
            .unwrap();

        let remote = MockRemoteStore::new();
        remote.set_offline(true);
        let (_, orchestrator) = orchestrator(Some(remote), dir.path());

        orchestrator.bootstrap().await;
        assert_eq!(orchestrator.status().await, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn sequential_pushes_chain_version_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MockRemoteStore::new();
        let (store, orchestrator) = orchestrator(Some(remote.clone()), dir.path());
        orchestrator.bootstrap().await;

        store.create_project(Project::default()).await;
        orchestrator.push().await.unwrap();
        let first_sha = remote.sha(DATA_PATH).unwrap();

        store.create_project(Project::default()).await;
        // The mock rejects any precondition other than `first_sha`, so a
        // second successful push proves the token was chained correctly.
        orchestrator.push().await.unwrap();
        assert_ne!(remote.sha(DATA_PATH).unwrap(), first_sha);
        assert_eq!(orchestrator.status().await, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn conflict_surfaces_error_and_keeps_token_bookkeeping() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MockRemoteStore::new().with_file(DATA_PATH, json!({"projects": []}));
        let (store, orchestrator) = orchestrator(Some(remote.clone()), dir.path());
        orchestrator.bootstrap().await;

        let adopted_sha = orchestrator.remote_sha.read().await.clone().unwrap();

        // An out-of-band writer moves the remote ahead of us.
        remote.overwrite(DATA_PATH, json!({"projects": [{"id": "x"}]}));

        store.create_project(Project::default()).await;
        let result = orchestrator.push().await;

        assert!(matches!(
            result,
            Err(SyncError::Remote(ContentsError::Conflict))
        ));
        assert_eq!(orchestrator.status().await, SyncStatus::Error);
        // The stale token is kept as-is: no silent adoption of the
        // out-of-band content.
        assert_eq!(
            orchestrator.remote_sha.read().await.clone().unwrap(),
            adopted_sha
        );
    }

    #[tokio::test]
    async fn push_without_remote_only_writes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (store, orchestrator) = orchestrator(None, dir.path());

        store.create_project(Project::default()).await;
        orchestrator.push().await.unwrap();

        assert_eq!(orchestrator.status().await, SyncStatus::Idle);
        let cached = LocalCacheRepository::new(dir.path())
            .read_bundle()
            .unwrap()
            .unwrap();
        assert_eq!(cached.projects.len(), 1);
        assert!(cached.export_date.is_some());
    }

    #[tokio::test]
    async fn first_push_after_cache_bootstrap_fetches_fresh_token() {
        let dir = tempfile::tempdir().unwrap();
        LocalCacheRepository::new(dir.path())
            .write_bundle(&StateBundle::default())
            .unwrap();

        // Remote has a document, but bootstrap never saw it (offline).
        let remote = MockRemoteStore::new().with_file(DATA_PATH, json!({"projects": []}));
        remote.set_offline(true);
        let (store, orchestrator) = orchestrator(Some(remote.clone()), dir.path());
        orchestrator.bootstrap().await;

        remote.set_offline(false);
        store.create_project(Project::default()).await;
        orchestrator.push().await.unwrap();

        assert_eq!(orchestrator.status().await, SyncStatus::Synced);
        let pushed = remote.file(DATA_PATH).unwrap();
        assert_eq!(pushed.value["projects"].as_array().unwrap().len(), 1);
    }
}
