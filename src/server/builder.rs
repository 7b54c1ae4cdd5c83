//! Server startup with configuration loading

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use std::path::Path;
use tracing::info;

/// Load configuration, build the server, and run it to completion
pub async fn run_server(config_path: Option<&Path>) -> Result<()> {
    info!("Starting pitchreel");

    let config = Config::load(config_path).await?;

    info!(
        "Provider chains: text={:?} speech={:?} video={:?}",
        config.routing.text, config.routing.speech, config.routing.video
    );

    let server = HttpServer::new(&config)?;
    info!(
        "Server starting at: http://{}:{}",
        config.server.host, config.server.port
    );
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /api/research - Research a company");
    info!("   POST /api/script - Generate sales script");
    info!("   POST /api/voice - Generate voice audio");
    info!("   POST /api/video - Generate video");
    info!("   POST /api/generate - Full pipeline");

    server.start().await
}
