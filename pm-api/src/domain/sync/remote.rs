use async_trait::async_trait;
use github_store::{ContentsClient, ContentsError, FileSha, RemoteFile};
use serde_json::Value;

/// Remote document storage, keyed by repository path.
///
/// Abstracts the Contents API client so the orchestrator and backup
/// rotation can be exercised against an in-memory double.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `Ok(None)` means the file has never been written — first run, not
    /// an error.
    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ContentsError>;

    /// Only the version token, when the body is not needed.
    async fn get_sha(&self, path: &str) -> Result<Option<FileSha>, ContentsError> {
        Ok(self.get(path).await?.map(|file| file.sha))
    }

    /// Conditional create-or-update; returns the new version token. A
    /// stale `sha` surfaces as [`ContentsError::Conflict`].
    async fn put(
        &self,
        path: &str,
        value: &Value,
        message: &str,
        sha: Option<&FileSha>,
    ) -> Result<FileSha, ContentsError>;
}

#[async_trait]
impl RemoteStore for ContentsClient {
    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ContentsError> {
        self.get_file(path).await
    }

    async fn get_sha(&self, path: &str) -> Result<Option<FileSha>, ContentsError> {
        ContentsClient::get_sha(self, path).await
    }

    async fn put(
        &self,
        path: &str,
        value: &Value,
        message: &str,
        sha: Option<&FileSha>,
    ) -> Result<FileSha, ContentsError> {
        self.put_file(path, value, message, sha).await
    }
}
