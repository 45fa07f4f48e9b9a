use std::env;
use std::fmt;

/// A personal access token with contents read/write scope on the target
/// repository. The token is never logged; `Debug` prints a placeholder.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the token from the `GITHUB_TOKEN` environment variable.
    pub fn from_env() -> Option<Self> {
        env::var("GITHUB_TOKEN").ok().map(Self::new)
    }

    pub fn as_bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"***").finish()
    }
}
