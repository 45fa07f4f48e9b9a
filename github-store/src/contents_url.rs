use std::env;

const DEFAULT_API_ROOT: &str = "https://api.github.com";

#[derive(Debug)]
pub struct ContentsUrl(String);

impl AsRef<str> for ContentsUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ContentsUrl {
    /// API root, overridable through `GITHUB_API_URL` (useful against a
    /// GitHub Enterprise host).
    pub fn api_root() -> Self {
        Self(env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_ROOT.to_string()))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    /// Pin the request to a branch via the `ref` query parameter.
    pub fn with_ref(&self, branch: &str) -> Self {
        if self.0.contains('?') {
            Self(format!("{}&ref={}", self.0, branch))
        } else {
            Self(format!("{}?ref={}", self.0, branch))
        }
    }
}
