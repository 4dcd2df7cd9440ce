//! Chirpy server binary.

use anyhow::Result;
use chirpy::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the chirpy server.
#[tokio::main]
async fn main() -> Result<()> {
    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=chirpy=debug,chirpy_db=trace cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chirpy=info,chirpy_db=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    tracing::debug!("Starting chirpy");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Chirpy stopped");
    Ok(())
}
