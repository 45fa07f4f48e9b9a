use std::env;
use std::error::Error;

use github_store::{ContentsClient, Credentials, RepoLocation};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::from_filename("./github-store/.env.local").ok();

    let owner = env::var("GITHUB_OWNER").expect("GITHUB_OWNER must be set");
    let repo = env::var("GITHUB_REPO").expect("GITHUB_REPO must be set");
    let branch = env::var("GITHUB_BRANCH").unwrap_or_else(|_| "main".to_string());
    let path = env::var("GITHUB_DATA_PATH").unwrap_or_else(|_| "data/app-state.json".to_string());
    let credentials = Credentials::from_env().expect("GITHUB_TOKEN must be set");

    let client = ContentsClient::new(RepoLocation::new(&owner, &repo, &branch), credentials);
    client.test_connection().await?;

    match client.get_file(&path).await? {
        Some(file) => {
            let count = |key: &str| {
                file.value
                    .get(key)
                    .and_then(|v| v.as_array())
                    .map_or(0, |a| a.len())
            };
            println!("state at {} (sha {})", path, file.sha);
            println!("  projects:    {}", count("projects"));
            println!("  architects:  {}", count("architects"));
            println!("  contractors: {}", count("contractors"));
        }
        None => println!("no state written yet at {}", path),
    }

    Ok(())
}
