//! In-memory remote store double for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use github_store::{ContentsError, FileSha, RemoteFile};
use serde_json::Value;

use super::RemoteStore;

/// Remote store backed by a HashMap, enforcing the same version-token
/// precondition the real API does: a put whose `sha` does not match the
/// stored one (or that omits it for an existing file) fails with
/// [`ContentsError::Conflict`].
#[derive(Clone, Default)]
pub struct MockRemoteStore {
    files: Arc<RwLock<HashMap<String, RemoteFile>>>,
    counter: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, assigning it a fresh sha.
    pub fn with_file(self, path: &str, value: Value) -> Self {
        let sha = self.next_sha();
        self.files
            .write()
            .unwrap()
            .insert(path.to_string(), RemoteFile { value, sha });
        self
    }

    /// When set, every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulates an out-of-band writer: replaces the content and bumps the
    /// sha without going through the precondition check.
    pub fn overwrite(&self, path: &str, value: Value) {
        let sha = self.next_sha();
        self.files
            .write()
            .unwrap()
            .insert(path.to_string(), RemoteFile { value, sha });
    }

    pub fn file(&self, path: &str) -> Option<RemoteFile> {
        self.files.read().unwrap().get(path).cloned()
    }

    pub fn sha(&self, path: &str) -> Option<FileSha> {
        self.file(path).map(|file| file.sha)
    }

    fn next_sha(&self) -> FileSha {
        FileSha(format!("sha-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn check_online(&self) -> Result<(), ContentsError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ContentsError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ContentsError> {
        self.check_online()?;
        Ok(self.file(path))
    }

    async fn put(
        &self,
        path: &str,
        value: &Value,
        _message: &str,
        sha: Option<&FileSha>,
    ) -> Result<FileSha, ContentsError> {
        self.check_online()?;

        let mut files = self.files.write().unwrap();
        let current = files.get(path).map(|file| file.sha.clone());
        match (current, sha) {
            (None, None) => {}
            (Some(ref current), Some(sha)) if current == sha => {}
            _ => return Err(ContentsError::Conflict),
        }

        let new_sha = FileSha(format!(
            "sha-{}",
            self.counter.fetch_add(1, Ordering::SeqCst) + 1
        ));
        files.insert(
            path.to_string(),
            RemoteFile {
                value: value.clone(),
                sha: new_sha.clone(),
            },
        );
        Ok(new_sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_update_requires_matching_sha() {
        let remote = MockRemoteStore::new();

        let first = remote
            .put("data/app-state.json", &json!({"v": 1}), "create", None)
            .await
            .unwrap();

        // Update with the current token succeeds and yields a new one.
        let second = remote
            .put("data/app-state.json", &json!({"v": 2}), "update", Some(&first))
            .await
            .unwrap();
        assert_ne!(first, second);

        // Reusing the stale token conflicts.
        let stale = remote
            .put("data/app-state.json", &json!({"v": 3}), "stale", Some(&first))
            .await;
        assert!(matches!(stale, Err(ContentsError::Conflict)));
    }

    #[tokio::test]
    async fn create_over_existing_file_conflicts() {
        let remote = MockRemoteStore::new().with_file("data/app-state.json", json!({}));
        let result = remote
            .put("data/app-state.json", &json!({}), "create", None)
            .await;
        assert!(matches!(result, Err(ContentsError::Conflict)));
    }

    #[tokio::test]
    async fn offline_mode_fails_with_network_error() {
        let remote = MockRemoteStore::new();
        remote.set_offline(true);
        assert!(matches!(
            remote.get("data/app-state.json").await,
            Err(ContentsError::Network(_))
        ));
    }
}
