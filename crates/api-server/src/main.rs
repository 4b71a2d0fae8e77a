use anyhow::Context;
use application::PortfolioApp;
use config::{Config, StorageBackend};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    info!("🚀 Starting portfolio API server");
    info!("💾 Storage backend: {}", config.storage_backend);
    info!("📁 Upload directory: {}", config.upload_dir.display());

    let app = match config.storage_backend {
        StorageBackend::Sqlite => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            PortfolioApp::new_with_database(database_url, config.upload_dir.clone())?
        }
        StorageBackend::Memory => PortfolioApp::in_memory(config.upload_dir.clone()),
    };
    app.prepare()
        .await
        .context("Failed to create upload directory")?;

    let router = api_server::router(Arc::new(app));

    // Run the server
    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 API Server listening on http://{}", bind_address);
    info!("📖 API Documentation:");
    for (method, path, description) in api_server::ROUTES {
        info!("   {:<6} {:<50} - {}", method, path, description);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
