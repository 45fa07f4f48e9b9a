use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    sync::{SyncMessage, SyncOrchestrator},
    AppStore, BackupService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AppStore>,
    pub orchestrator: Arc<SyncOrchestrator>,
    /// Absent when no remote credential is configured.
    pub backups: Option<Arc<BackupService>>,
    sync_tx: mpsc::Sender<SyncMessage>,
}

impl AppState {
    pub fn new(
        store: Arc<AppStore>,
        orchestrator: Arc<SyncOrchestrator>,
        backups: Option<Arc<BackupService>>,
        sync_tx: mpsc::Sender<SyncMessage>,
    ) -> Self {
        Self {
            store,
            orchestrator,
            backups,
            sync_tx,
        }
    }

    /// Queues a push through the orchestrator's run loop, so manual syncs
    /// are serialized with mutation-triggered ones.
    pub async fn request_sync(&self) -> bool {
        self.sync_tx.send(SyncMessage::Push).await.is_ok()
    }
}
