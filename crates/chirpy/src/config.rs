//! Configuration management for chirpy.
//!
//! Configuration is read from an optional YAML file. Every field has a
//! default, so a partial file (or none at all) is valid:
//!
//! ```yaml
//! server:
//!   host: 127.0.0.1
//!   port: 8080
//! database:
//!   path: database.json
//! chirps:
//!   max_length: 140
//!   profane_words: [kerfuffle, sharbert, fornax]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default document path, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "database.json";

/// Default maximum chirp length in bytes
pub const DEFAULT_MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced by `****` unless configured otherwise
pub const DEFAULT_PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChirpyConfig {
    /// Listener settings
    pub server: ServerConfig,

    /// Document store settings
    pub database: DatabaseConfig,

    /// Chirp validation settings
    pub chirps: ChirpConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    pub host: String,

    /// Port to bind to (default: 8080)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the JSON document
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// Chirp validation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChirpConfig {
    /// Maximum body length in bytes
    pub max_length: usize,

    /// Words to censor (matched case-insensitively)
    pub profane_words: Vec<String>,
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_CHIRP_LENGTH,
            profane_words: DEFAULT_PROFANE_WORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ChirpyConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for
    /// this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid YAML for this structure.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
