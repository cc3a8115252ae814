// Nexo API server

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use nexo_common::Config;
use nexo_conversations::StoreFactory;
use nexo_llm::{LlmConfig, LlmServiceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    nexo_app::init_tracing(&config);

    info!(
        store = ?config.store_provider,
        cors = ?config.cors_origins,
        "Starting Nexo API server"
    );

    let store = StoreFactory::create(&config).await.map_err(|e| {
        error!("Failed to initialize conversation store: {}", e);
        anyhow::anyhow!("Store initialization failed: {}", e)
    })?;

    let llm_config = LlmConfig::from_env()?;
    let llm = LlmServiceFactory::create(llm_config).map_err(|e| {
        error!("Failed to create completion provider: {}", e);
        e
    })?;

    let app = nexo_app::create_app(&config, Arc::clone(&store), Arc::from(llm));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
