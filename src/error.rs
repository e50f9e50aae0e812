//! Error types for the iacscan CLI.
//!
//! Library errors are wrapped as they are so their messages reach the user
//! verbatim; the CLI only adds context for the files it reads itself.

use iacscan_assessments::ThresholdErrors;
use iacscan_downloader::DownloadError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration in {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// No download directory was configured and none could be derived.
    #[error("could not determine a download directory; set IACSCAN_DOWNLOAD_DIR")]
    NoDownloadDir,

    /// The findings file is not valid JSON of the expected shape.
    #[error("could not read findings from {path}: {reason}")]
    Findings {
        /// Path of the findings file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A `--fail` threshold was rejected.
    #[error("invalid failure thresholds: {0}")]
    Thresholds(#[from] ThresholdErrors),

    /// A download cache operation failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Output could not be serialised.
    #[error("could not serialise output: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
