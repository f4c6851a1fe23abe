use std::fs;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use docsort::archive::{self, ArchiveError};
use docsort::classify::ZeroShotClient;
use docsort::config::SorterConfig;
use docsort::extract::PdfExtractor;
use docsort::sorter::{IntakeSorter, SorterError};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SorterConfig::from_env();
    tracing::info!("Starting docsort...");

    if let Err(e) = run(config).await {
        tracing::error!("Fatal startup error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: SorterConfig) -> Result<(), SorterError> {
    // Startup is the only place a failure aborts the process: without the
    // intake directory and the archive skeleton no later move can succeed
    fs::create_dir_all(&config.intake_dir).map_err(|source| ArchiveError::CreateDir {
        path: config.intake_dir.clone(),
        source,
    })?;
    archive::build_skeleton(&config.archive_root, config.years.clone())?;
    tracing::info!("Directory structure initialized");

    let sorter = IntakeSorter::new(config, PdfExtractor, ZeroShotClient::from_env());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    sorter.run(shutdown).await;
    Ok(())
}
