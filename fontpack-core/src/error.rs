//! Error types for fontpack with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the public fontpack operations
#[derive(Error, Debug)]
pub enum FontpackError {
    /// Output directory escapes the project root or is absolute
    #[error("Invalid output directory '{path}': {reason}")]
    InvalidOutputDir { path: String, reason: String },

    /// Requested family is absent from the remote catalog
    #[error("Font family '{0}' was not found in the catalog")]
    FamilyNotFound(String),

    /// The catalog listing endpoint needs an API key
    #[error("No catalog API key configured.\n\nSet the {env} environment variable to query the font catalog.")]
    MissingApiKey { env: String },

    /// Remote responded with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// Transport-level failure talking to the catalog
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Filesystem failure on a specific path
    #[error("Filesystem error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed remote or local data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every variant download for a font failed
    #[error("Download failed: {0}")]
    DownloadFailed(String),
}

pub type Result<T> = std::result::Result<T, FontpackError>;

impl FontpackError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FontpackError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for a standalone CLI
    ///
    /// 2 = bad input or config, 3 = not found, 4 = network, 5 = filesystem.
    pub fn exit_code(&self) -> i32 {
        match self {
            FontpackError::InvalidOutputDir { .. }
            | FontpackError::Config(_)
            | FontpackError::MissingApiKey { .. } => 2,
            FontpackError::FamilyNotFound(_) => 3,
            FontpackError::Http { .. }
            | FontpackError::Network(_)
            | FontpackError::DownloadFailed(_) => 4,
            FontpackError::Io { .. } => 5,
            FontpackError::Parse(_) => 1,
        }
    }
}
