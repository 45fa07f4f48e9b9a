use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use tokio::sync::{watch, RwLock};

use super::models::{Architect, Contractor, Project, StateBundle};

/// Owner of the in-memory entity arrays.
///
/// Every mutation funnels through [`AppStore::commit`], which stamps a
/// revision and notifies a single change feed; the sync orchestrator
/// subscribes to that feed instead of being wired into every caller.
/// Reads are cheap snapshots.
pub struct AppStore {
    state: RwLock<StateBundle>,
    revision: AtomicU64,
    change_tx: watch::Sender<u64>,
}

impl AppStore {
    pub fn new(initial: StateBundle) -> Self {
        let (change_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(initial),
            revision: AtomicU64::new(0),
            change_tx,
        }
    }

    /// Change feed carrying the revision of the latest commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.change_tx.subscribe()
    }

    pub async fn snapshot(&self) -> StateBundle {
        self.state.read().await.clone()
    }

    /// Replaces the state without notifying the change feed. Used when
    /// adopting a bundle that came from storage — adopting must not
    /// immediately push the same data back out.
    pub async fn adopt(&self, bundle: StateBundle) {
        *self.state.write().await = bundle;
    }

    /// The single mutation entry point: applies the closure under the
    /// write lock, bumps the revision and notifies the change feed.
    pub async fn commit<T>(&self, mutate: impl FnOnce(&mut StateBundle) -> T) -> T {
        let result = {
            let mut state = self.state.write().await;
            mutate(&mut state)
        };
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.change_tx.send_replace(revision);
        result
    }

    /// Replaces the whole state (import, backup restore). Unlike
    /// [`AppStore::adopt`] this is a mutation and triggers the feed.
    pub async fn replace_all(&self, mut bundle: StateBundle) -> StateBundle {
        bundle.export_date = None;
        self.commit(move |state| {
            *state = bundle;
            state.clone()
        })
        .await
    }

    pub async fn create_project(&self, mut project: Project) -> Project {
        self.commit(move |state| {
            project.id = unique_key(|key| state.projects.iter().any(|p| p.id == key));
            project.created_at = Some(now_iso());
            state.projects.push(project.clone());
            project
        })
        .await
    }

    pub async fn update_project(&self, id: &str, mut updated: Project) -> Option<Project> {
        self.commit(|state| {
            let existing = state.projects.iter_mut().find(|p| p.id == id)?;
            updated.id = existing.id.clone();
            updated.created_at = existing.created_at.clone();
            *existing = updated.clone();
            Some(updated)
        })
        .await
    }

    pub async fn delete_project(&self, id: &str) -> bool {
        self.commit(|state| {
            let before = state.projects.len();
            state.projects.retain(|p| p.id != id);
            state.projects.len() != before
        })
        .await
    }

    pub async fn create_architect(&self, mut architect: Architect) -> Architect {
        self.commit(move |state| {
            architect.id = unique_key(|key| state.architects.iter().any(|a| a.id == key));
            architect.created_at = Some(now_iso());
            state.architects.push(architect.clone());
            architect
        })
        .await
    }

    pub async fn update_architect(&self, id: &str, mut updated: Architect) -> Option<Architect> {
        self.commit(|state| {
            let existing = state.architects.iter_mut().find(|a| a.id == id)?;
            updated.id = existing.id.clone();
            updated.created_at = existing.created_at.clone();
            *existing = updated.clone();
            Some(updated)
        })
        .await
    }

    pub async fn delete_architect(&self, id: &str) -> bool {
        self.commit(|state| {
            let before = state.architects.len();
            state.architects.retain(|a| a.id != id);
            state.architects.len() != before
        })
        .await
    }

    pub async fn create_contractor(&self, mut contractor: Contractor) -> Contractor {
        self.commit(move |state| {
            contractor.id = unique_key(|key| state.contractors.iter().any(|c| c.id == key));
            contractor.created_at = Some(now_iso());
            state.contractors.push(contractor.clone());
            contractor
        })
        .await
    }

    pub async fn update_contractor(&self, id: &str, mut updated: Contractor) -> Option<Contractor> {
        self.commit(|state| {
            let existing = state.contractors.iter_mut().find(|c| c.id == id)?;
            updated.id = existing.id.clone();
            updated.created_at = existing.created_at.clone();
            *existing = updated.clone();
            Some(updated)
        })
        .await
    }

    pub async fn delete_contractor(&self, id: &str) -> bool {
        self.commit(|state| {
            let before = state.contractors.len();
            state.contractors.retain(|c| c.id != id);
            state.contractors.len() != before
        })
        .await
    }
}

/// ISO-8601 timestamp with millisecond precision, matching what the
/// original clients wrote.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Client-style entity key: millisecond timestamp, bumped on the rare
/// collision within a collection.
fn unique_key(taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let key = candidate.to_string();
        if !taken(&key) {
            return key;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProjectStatus;

    #[tokio::test]
    async fn create_assigns_key_and_timestamp() {
        let store = AppStore::new(StateBundle::default());
        let project = store
            .create_project(Project {
                name: "Нов проект 1".to_string(),
                ..Default::default()
            })
            .await;

        assert!(!project.id.is_empty());
        assert!(project.created_at.is_some());
        assert_eq!(store.snapshot().await.projects.len(), 1);
    }

    #[tokio::test]
    async fn rapid_creates_get_distinct_keys() {
        let store = AppStore::new(StateBundle::default());
        let first = store.create_project(Project::default()).await;
        let second = store.create_project(Project::default()).await;
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn update_preserves_key_and_creation_time() {
        let store = AppStore::new(StateBundle::default());
        let created = store
            .create_project(Project {
                name: "Кула А".to_string(),
                ..Default::default()
            })
            .await;

        let updated = store
            .update_project(
                &created.id,
                Project {
                    id: "spoofed".to_string(),
                    name: "Кула А - фаза 2".to_string(),
                    status: ProjectStatus::OnHold,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, ProjectStatus::OnHold);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let store = AppStore::new(StateBundle::default());
        assert!(store.update_project("nope", Project::default()).await.is_none());
    }

    #[tokio::test]
    async fn delete_filters_by_key() {
        let store = AppStore::new(StateBundle::default());
        let created = store.create_architect(Architect::default()).await;

        assert!(store.delete_architect(&created.id).await);
        assert!(!store.delete_architect(&created.id).await);
        assert!(store.snapshot().await.architects.is_empty());
    }

    #[tokio::test]
    async fn commit_notifies_change_feed() {
        let store = AppStore::new(StateBundle::default());
        let mut changes = store.subscribe();
        assert_eq!(*changes.borrow(), 0);

        store.create_contractor(Contractor::default()).await;
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn adopt_is_silent() {
        let store = AppStore::new(StateBundle::default());
        let changes = store.subscribe();

        store
            .adopt(StateBundle {
                export_date: Some("2025-06-01T00:00:00.000Z".to_string()),
                ..Default::default()
            })
            .await;

        assert!(!changes.has_changed().unwrap());
        assert!(store.snapshot().await.export_date.is_some());
    }
}
