//! pitchreel - AI sales-video backend

use clap::Parser;
use pitchreel::server;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pitchreel", version, about = "AI sales-video backend")]
struct Cli {
    /// Path to a YAML configuration file (defaults to config/pitchreel.yaml,
    /// falling back to environment variables)
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env first so it can feed both logging and configuration
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match server::builder::run_server(cli.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
