//! watch-store server binary.

use anyhow::Context;
use log::info;
use std::sync::Arc;
use watch_store::backend::InMemoryBackend;
use watch_store::config::BackendKind;
use watch_store::observability::LogMetrics;
use watch_store::{http, Config, DocumentBackend, DocumentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // RUST_LOG, when set, takes precedence over LOG_LEVEL
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .try_init()
        .ok();

    match &config.backend {
        BackendKind::Memory => {
            info!("Using in-memory backend; data is lost on exit");
            serve(&config, InMemoryBackend::new()).await
        }
        #[cfg(feature = "redis")]
        BackendKind::Redis { url, pool_size } => {
            let backend = watch_store::backend::RedisBackend::from_connection_string(url, *pool_size)
                .await
                .context("Failed to connect to Redis")?;
            info!("Using Redis backend");
            serve(&config, backend).await
        }
        #[cfg(not(feature = "redis"))]
        BackendKind::Redis { .. } => {
            anyhow::bail!("STORE_BACKEND=redis requires building with the `redis` feature")
        }
    }
}

async fn serve<B: DocumentBackend + 'static>(config: &Config, backend: B) -> anyhow::Result<()> {
    let store = DocumentStore::new(backend).with_metrics(LogMetrics);
    let app = http::router(Arc::new(store));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("watch-store {} listening on http://{}", watch_store::VERSION, address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
