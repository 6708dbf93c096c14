mod config;
mod routes;

use config::Config;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upstream::{YouTubeCaptions, YtDlp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if let Some(proxy) = &config.default_proxy {
        info!("Default proxy: {}", proxy.url());
    }

    let app = routes::create_app(
        Arc::new(YouTubeCaptions::new()),
        Arc::new(YtDlp::new(config.ytdlp.clone())),
        config.default_proxy.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
