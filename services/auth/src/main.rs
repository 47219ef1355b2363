//! Token service binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth_service::clock::SystemClock;
use auth_service::config::{Config, StoreBackend};
use auth_service::identity::AnyPasswordVerifier;
use auth_service::store::{AuthStore, MemoryStore, RedisStore};
use auth_service::{http, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting auth service");

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let store: Arc<dyn AuthStore> = match &config.store_backend {
        StoreBackend::Memory => {
            info!("using in-memory store backend");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis { url } => {
            info!("using redis store backend");
            Arc::new(RedisStore::connect(url).await?)
        }
    };

    let service = Arc::new(TokenService::new(
        store,
        Arc::new(AnyPasswordVerifier),
        Arc::new(SystemClock),
        &config,
    ));

    let app = http::router(service);
    let listener = TcpListener::bind(addr).await?;
    info!("Auth service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
