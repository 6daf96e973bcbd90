use std::sync::Arc;

use rastarockets_api::config::config;
use rastarockets_api::database::{DocumentStore, ElasticsearchStore, MemoryStore};
use rastarockets_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up ELASTIC_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config().clone();
    tracing::info!("Starting RastaRockets API in {:?} mode", config.environment);

    // --memory runs against a throwaway in-process store
    let store: Arc<dyn DocumentStore> = if std::env::args().any(|arg| arg == "--memory") {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = ElasticsearchStore::new(&config.store)?;
        if let Err(e) = store.ping().await {
            tracing::warn!("Elasticsearch not reachable at {}: {}", config.store.url, e);
        }
        Arc::new(store)
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, store)?;
    let app = rastarockets_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("RastaRockets API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
