//! Command-line interface for the chirpy server.

use crate::config::ChirpyConfig;
use crate::server::{self, AppState};
use anyhow::Context;
use chirpy_db::Store;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Serve the chirpy HTTP API from a single JSON document
#[derive(Parser, Debug, Clone)]
#[command(name = "chirpy", version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the JSON document (overrides the config file)
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Delete the database file before starting
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut ChirpyConfig) {
        if let Some(path) = &self.database {
            config.database.path.clone_from(path);
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }

    /// Resolve configuration, open the store, and serve until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, the store
    /// cannot be opened, or the listener fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => ChirpyConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ChirpyConfig::default(),
        };
        self.apply(&mut config);

        let db_path = &config.database.path;
        if self.debug {
            tracing::warn!(path = %db_path.display(), "Debug mode: discarding existing database");
            chirpy_db::remove(db_path).context("Failed to remove database")?;
        }

        let store = Store::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        let state = AppState::new(Arc::new(store), &config.chirps);

        server::serve(&config.server.socket_addr(), state)
            .await
            .context("Server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn no_arguments_keeps_config() {
        let cli = Cli::try_parse_from(["chirpy"]).unwrap();
        let mut config = ChirpyConfig::default();

        cli.apply(&mut config);

        assert!(!cli.debug);
        assert_eq!(config, ChirpyConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "chirpy",
            "--database",
            "/tmp/chirps.json",
            "--host",
            "0.0.0.0",
            "-p",
            "9999",
            "--debug",
        ])
        .unwrap();
        let mut config = ChirpyConfig::default();

        cli.apply(&mut config);

        assert!(cli.debug);
        assert_eq!(config.database.path, Path::new("/tmp/chirps.json"));
        assert_eq!(config.server.socket_addr(), "0.0.0.0:9999");
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["chirpy", "--port", "70000"]).is_err());
    }
}
