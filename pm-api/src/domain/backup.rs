use std::sync::Arc;

use github_store::ContentsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use super::models::StateBundle;
use super::sync::RemoteStore;
use super::{migrate_bundle, now_iso, AppStore};

const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup not found")]
    NotFound,
    #[error(transparent)]
    Remote(#[from] ContentsError),
    #[error("malformed backup: {0}")]
    Malformed(String),
}

/// The three rotating backup slots kept in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupSlot {
    #[serde(rename = "latest")]
    Latest,
    #[serde(rename = "previous-1")]
    Previous1,
    #[serde(rename = "previous-2")]
    Previous2,
}

impl BackupSlot {
    pub const ALL: [BackupSlot; 3] = [Self::Latest, Self::Previous1, Self::Previous2];

    fn path(&self) -> &'static str {
        match self {
            Self::Latest => "backups/backup-latest.json",
            Self::Previous1 => "backups/backup-previous-1.json",
            Self::Previous2 => "backups/backup-previous-2.json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub bundle: StateBundle,
}

/// One row of the backup listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub slot: BackupSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub projects: usize,
    pub architects: usize,
    pub contractors: usize,
}

/// Keeps the last three snapshots in the repository, rotated on every
/// backup: previous-1 becomes previous-2, latest becomes previous-1, the
/// current state becomes latest.
pub struct BackupService {
    remote: Arc<dyn RemoteStore>,
    store: Arc<AppStore>,
}

impl BackupService {
    pub fn new(remote: Arc<dyn RemoteStore>, store: Arc<AppStore>) -> Self {
        Self { remote, store }
    }

    #[instrument(name = "BackupService::create_backup", skip(self))]
    pub async fn create_backup(&self) -> Result<BackupEntry, BackupError> {
        let latest = self.remote.get(BackupSlot::Latest.path()).await?;
        let previous1 = self.remote.get(BackupSlot::Previous1.path()).await?;

        if let Some(previous1) = &previous1 {
            let previous2_sha = self.remote.get_sha(BackupSlot::Previous2.path()).await?;
            self.remote
                .put(
                    BackupSlot::Previous2.path(),
                    &previous1.value,
                    "chore: rotate backup previous-1 -> previous-2",
                    previous2_sha.as_ref(),
                )
                .await?;
        }

        if let Some(latest) = &latest {
            self.remote
                .put(
                    BackupSlot::Previous1.path(),
                    &latest.value,
                    "chore: rotate backup latest -> previous-1",
                    previous1.as_ref().map(|file| &file.sha),
                )
                .await?;
        }

        let document = BackupDocument {
            version: BACKUP_VERSION.to_string(),
            timestamp: now_iso(),
            bundle: self.store.snapshot().await,
        };
        let value = serde_json::to_value(&document)
            .map_err(|e| BackupError::Malformed(e.to_string()))?;
        self.remote
            .put(
                BackupSlot::Latest.path(),
                &value,
                &format!("chore: auto-backup {}", document.timestamp),
                latest.as_ref().map(|file| &file.sha),
            )
            .await?;

        Ok(entry(BackupSlot::Latest, &document))
    }

    /// Whichever slots exist, in rotation order.
    pub async fn list_backups(&self) -> Result<Vec<BackupEntry>, BackupError> {
        let mut entries = Vec::new();
        for slot in BackupSlot::ALL {
            let Some(file) = self.remote.get(slot.path()).await? else {
                continue;
            };
            let document = parse_backup(file.value)?;
            entries.push(entry(slot, &document));
        }
        Ok(entries)
    }

    /// Replaces the application state with a backup's content. Goes through
    /// the store's mutation entry point, so the restore itself is synced.
    #[instrument(name = "BackupService::restore_backup", skip(self))]
    pub async fn restore_backup(&self, slot: BackupSlot) -> Result<StateBundle, BackupError> {
        let file = self
            .remote
            .get(slot.path())
            .await?
            .ok_or(BackupError::NotFound)?;

        let document = parse_backup(file.value)?;
        Ok(self.store.replace_all(document.bundle).await)
    }
}

fn parse_backup(mut value: serde_json::Value) -> Result<BackupDocument, BackupError> {
    migrate_bundle(&mut value);
    serde_json::from_value(value).map_err(|e| BackupError::Malformed(e.to_string()))
}

fn entry(slot: BackupSlot, document: &BackupDocument) -> BackupEntry {
    BackupEntry {
        slot,
        timestamp: (!document.timestamp.is_empty()).then(|| document.timestamp.clone()),
        projects: document.bundle.projects.len(),
        architects: document.bundle.architects.len(),
        contractors: document.bundle.contractors.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Project;
    use crate::domain::sync::MockRemoteStore;

    fn service(remote: MockRemoteStore) -> (Arc<AppStore>, BackupService) {
        let store = Arc::new(AppStore::new(StateBundle {
            projects: vec![Project {
                id: "1".to_string(),
                name: "Кула А".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }));
        let service = BackupService::new(Arc::new(remote), store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn first_backup_creates_latest_only() {
        let remote = MockRemoteStore::new();
        let (_, service) = service(remote.clone());

        let entry = service.create_backup().await.unwrap();

        assert_eq!(entry.slot, BackupSlot::Latest);
        assert_eq!(entry.projects, 1);
        assert!(remote.file(BackupSlot::Latest.path()).is_some());
        assert!(remote.file(BackupSlot::Previous1.path()).is_none());
    }

    #[tokio::test]
    async fn repeated_backups_rotate_slots() {
        let remote = MockRemoteStore::new();
        let (store, service) = service(remote.clone());

        service.create_backup().await.unwrap();
        let first = remote.file(BackupSlot::Latest.path()).unwrap();

        store.create_project(Project::default()).await;
        service.create_backup().await.unwrap();
        let second = remote.file(BackupSlot::Latest.path()).unwrap();

        store.create_project(Project::default()).await;
        service.create_backup().await.unwrap();

        // latest -> previous-1 -> previous-2 across the three runs.
        assert_eq!(
            remote.file(BackupSlot::Previous2.path()).unwrap().value,
            first.value
        );
        assert_eq!(
            remote.file(BackupSlot::Previous1.path()).unwrap().value,
            second.value
        );
        assert_eq!(service.list_backups().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn restore_replaces_state() {
        let remote = MockRemoteStore::new();
        let (store, service) = service(remote.clone());
        service.create_backup().await.unwrap();

        store.create_project(Project::default()).await;
        assert_eq!(store.snapshot().await.projects.len(), 2);

        let restored = service.restore_backup(BackupSlot::Latest).await.unwrap();
        assert_eq!(restored.projects.len(), 1);
        assert_eq!(store.snapshot().await.projects.len(), 1);
    }

    #[tokio::test]
    async fn restore_missing_slot_is_not_found() {
        let remote = MockRemoteStore::new();
        let (_, service) = service(remote);

        assert!(matches!(
            service.restore_backup(BackupSlot::Previous2).await,
            Err(BackupError::NotFound)
        ));
    }
}
