use std::str::FromStr;

use github_store::{ContentsClient, Credentials, RepoLocation};
use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub github: GithubSettings,
    pub cache: CacheSettings,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    /// Frontend origin allowed by CORS. `None` allows any origin (local dev).
    pub app_url: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct GithubSettings {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub data_path: String,
    /// Contents read/write token. Absent means offline mode: mutations only
    /// reach the local cache and nothing is pushed.
    pub token: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct CacheSettings {
    pub dir: String,
}

impl GithubSettings {
    pub fn location(&self) -> RepoLocation {
        RepoLocation::new(&self.owner, &self.repo, &self.branch)
    }

    pub fn to_client(&self) -> Option<ContentsClient> {
        self.token
            .as_ref()
            .map(|token| ContentsClient::new(self.location(), Credentials::new(token.clone())))
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .expect("Failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("PM")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
