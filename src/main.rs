use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use media_relay::{config::Config, routes::create_router, storage::CloudinaryClient, utils, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    utils::init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    info!(server = ?config.server, cloudinary = ?config.cloudinary, "Configuration loaded");

    // Staging directory for incoming multipart files
    tokio::fs::create_dir_all(&config.upload.staging_dir)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to create staging directory {}: {}",
                config.upload.staging_dir.display(),
                e
            )
        })?;

    // One store client for the whole process
    let store = CloudinaryClient::new(config.cloudinary.clone())?;

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST {}: {}", config.server.host, e))?;
    let addr = SocketAddr::from((host, config.server.port));

    // Create shared state
    let state = AppState::new(config, Arc::new(store));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Server running on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
