use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{decode_content, encode_content, FileSha, RemoteFile, RepoLocation};
use crate::ContentsUrl;

use super::Credentials;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT_VALUE: &str = "construction-pm-store";

/// Client for the GitHub Contents API, scoped to a single repository and
/// branch. Reads and writes repository files as base64-encoded JSON plus a
/// content-hash version token.
///
/// Every request is a single best-effort call: no retry, no backoff, no
/// batching. A stale version token on write surfaces as [`ContentsError::Conflict`]
/// and is never reconciled automatically.
pub struct ContentsClient {
    location: RepoLocation,
    credentials: Credentials,
    http: reqwest::Client,
}

impl ContentsClient {
    pub fn new(location: RepoLocation, credentials: Credentials) -> Self {
        Self {
            location,
            credentials,
            http: reqwest::Client::new(),
        }
    }

    pub fn location(&self) -> &RepoLocation {
        &self.location
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Ok(auth) = HeaderValue::from_str(&self.credentials.as_bearer_header()) {
            headers.insert(AUTHORIZATION, auth);
        }
        headers
    }

    fn file_url(&self, path: &str) -> ContentsUrl {
        ContentsUrl::api_root()
            .append_path(&format!(
                "/repos/{}/{}/contents",
                self.location.owner, self.location.repo
            ))
            .append_path(path)
    }

    /// Fetches a repository file. `Ok(None)` means the file has never been
    /// written (first run), which is not an error.
    pub async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, ContentsError> {
        let Some(contents) = self.get_contents(path).await? else {
            return Ok(None);
        };

        let value = decode_content(&contents.content)
            .map_err(|e| ContentsError::Malformed(e.to_string()))?;

        Ok(Some(RemoteFile {
            value,
            sha: FileSha(contents.sha),
        }))
    }

    /// Fetches only the version token of a file, without decoding its body.
    pub async fn get_sha(&self, path: &str) -> Result<Option<FileSha>, ContentsError> {
        let contents = self.get_contents(path).await?;
        Ok(contents.map(|c| FileSha(c.sha)))
    }

    /// Creates or updates a repository file, committing to the configured
    /// branch. A `sha` makes the write conditional on the remote content
    /// being unchanged since the token was obtained; without one the write
    /// is treated as a create. Returns the new version token.
    pub async fn put_file(
        &self,
        path: &str,
        value: &Value,
        message: &str,
        sha: Option<&FileSha>,
    ) -> Result<FileSha, ContentsError> {
        let url = self.file_url(path);
        let body = PutContentsBody {
            message,
            content: encode_content(value),
            branch: &self.location.branch,
            sha: sha.map(FileSha::as_str),
        };

        tracing::debug!(
            "PUT {} on {} (conditional: {})",
            path,
            self.location,
            sha.is_some()
        );
        let resp = self
            .http
            .put(url.as_ref())
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| ContentsError::Network(e.to_string()))?;

        let status = resp.status();
        match status.as_u16() {
            401 | 403 => Err(ContentsError::Unauthorized),
            // 409: stale sha. 422: no sha supplied but the file exists, so
            // the caller's view is stale all the same.
            409 | 422 => Err(ContentsError::Conflict),
            _ if status.is_success() => {
                let put: PutContentsResponse = resp
                    .json()
                    .await
                    .map_err(|e| ContentsError::Malformed(e.to_string()))?;
                Ok(FileSha(put.content.sha))
            }
            _ => Err(ContentsError::ApiStatus {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Verifies the coordinates and credential by reading the repository
    /// record itself.
    pub async fn test_connection(&self) -> Result<(), ContentsError> {
        let url = ContentsUrl::api_root().append_path(&format!(
            "/repos/{}/{}",
            self.location.owner, self.location.repo
        ));

        let resp = self
            .http
            .get(url.as_ref())
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| ContentsError::Network(e.to_string()))?;

        let status = resp.status();
        match status.as_u16() {
            401 | 403 => Err(ContentsError::Unauthorized),
            _ if status.is_success() => Ok(()),
            _ => Err(ContentsError::ApiStatus {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn get_contents(&self, path: &str) -> Result<Option<ContentsResponse>, ContentsError> {
        let url = self.file_url(path).with_ref(&self.location.branch);

        let resp = self
            .http
            .get(url.as_ref())
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| ContentsError::Network(e.to_string()))?;

        let status = resp.status();
        match status.as_u16() {
            404 => Ok(None),
            401 | 403 => Err(ContentsError::Unauthorized),
            _ if status.is_success() => {
                let contents: ContentsResponse = resp
                    .json()
                    .await
                    .map_err(|e| ContentsError::Malformed(e.to_string()))?;
                Ok(Some(contents))
            }
            _ => Err(ContentsError::ApiStatus {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum ContentsError {
    #[error("unauthorized: missing or invalid access token")]
    Unauthorized,
    #[error("write conflict: remote content changed since it was last read")]
    Conflict,
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("GitHub API error {status}: {body}")]
    ApiStatus { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: PutContentsFile,
}

#[derive(Debug, Deserialize)]
struct PutContentsFile {
    sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_body_omits_missing_sha() {
        let body = PutContentsBody {
            message: "chore: save app data",
            content: "e30=".to_string(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());

        let body = PutContentsBody {
            sha: Some("abc123"),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn conflict_is_distinct_from_generic_failure() {
        let conflict = ContentsError::Conflict;
        let generic = ContentsError::ApiStatus {
            status: 500,
            body: "oops".to_string(),
        };
        assert!(matches!(conflict, ContentsError::Conflict));
        assert!(!matches!(generic, ContentsError::Conflict));
    }
}
