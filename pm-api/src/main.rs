use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pm_api::config::read_config;
use pm_api::domain::sync::{RemoteStore, SyncOrchestrator};
use pm_api::domain::{models::StateBundle, AppStore, BackupService};
use pm_api::repositories::LocalCacheRepository;
use pm_api::{router, AppState};

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./pm-api/.env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = read_config().expect("Failed to read configuration");

    let cache = LocalCacheRepository::new(&config.cache.dir);
    let remote: Option<Arc<dyn RemoteStore>> = config
        .github
        .to_client()
        .map(|client| Arc::new(client) as Arc<dyn RemoteStore>);
    if remote.is_none() {
        tracing::warn!("no GitHub token configured, running in offline mode");
    } else {
        tracing::info!("syncing to {}", config.github.location());
    }

    let store = Arc::new(AppStore::new(StateBundle::default()));
    let orchestrator = Arc::new(SyncOrchestrator::new(
        store.clone(),
        cache,
        remote.clone(),
        config.github.data_path.clone(),
    ));
    orchestrator.bootstrap().await;

    let (sync_tx, sync_rx) = mpsc::channel(16);
    tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.run(sync_rx).await }
    });

    let backups = remote.map(|remote| Arc::new(BackupService::new(remote, store.clone())));

    let app_state = AppState::new(store, orchestrator, backups, sync_tx);
    let app = router::create(app_state, &config);

    let address = format!(
        "{}:{}",
        config.application.host, config.application.port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");
    tracing::info!("listening on {}", address);

    axum::serve(listener, app).await.expect("Server error");
}
