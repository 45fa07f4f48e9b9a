use std::fmt::{self, Display};

use serde_json::Value;

/// Coordinates of the repository a store reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoLocation {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            branch: branch.to_owned(),
        }
    }
}

impl Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Opaque version token of a file's current content. A write that carries
/// a stale token is rejected by the API with a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSha(pub String);

impl FileSha {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FileSha {
    fn from(sha: String) -> Self {
        Self(sha)
    }
}

/// A decoded remote document together with its version token.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub value: Value,
    pub sha: FileSha,
}
