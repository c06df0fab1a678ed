use clap::Args;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Override the configured port")]
    pub port: Option<u16>,

    #[arg(long, help = "Create the schema before serving")]
    pub migrate: bool,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;
    info!("Starting Houzdey API in {:?} mode", config.environment);

    if args.migrate && config.database.backend == StoreBackend::Postgres {
        let manager = DatabaseManager::connect(&config.database).await?;
        manager.migrate().await?;
        manager.close().await;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config).await?;
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;
    info!("Houzdey API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
