//! Error types for release resolution, downloads, and unpacking.
//!
//! Each variant names the offending value so the message alone explains
//! what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Errors arising from resolving, fetching, or recording a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// No release asset matched the current platform.
    #[error("could not find a matching release asset from: {assets}")]
    NoMatchingAsset {
        /// Space-separated names of every asset considered.
        assets: String,
    },

    /// More than one asset shared the top priority.
    #[error("multiple matching assets found: {candidates}")]
    AmbiguousAsset {
        /// Space-separated names of the tied assets.
        candidates: String,
    },

    /// A plain URL download needs a name to file it under.
    #[error("name must be specified for plain URL downloads")]
    NameRequired,

    /// A plain URL download needs an explicit version.
    #[error("a version must be specified to install {name} from a URL")]
    VersionRequired {
        /// Name of the artifact being installed.
        name: String,
    },

    /// Neither a URL nor a GitHub repository was given.
    #[error("download URL must be specified for {name}")]
    UrlRequired {
        /// Name of the artifact being installed.
        name: String,
    },

    /// The downloaded file has a suffix no unpacker understands.
    #[error("unknown archive format {file_name}")]
    UnknownArchiveFormat {
        /// Base name of the downloaded file.
        file_name: String,
    },

    /// The artifact has never been installed.
    #[error("{name} is not installed")]
    NotInstalled {
        /// Name of the artifact.
        name: String,
    },

    /// Unpacking the downloaded file failed.
    #[error(transparent)]
    Unpack(#[from] UnpackError),

    /// Metadata could not be read or written as JSON.
    #[error("invalid download metadata in {path}: {source}")]
    Metadata {
        /// The metadata file.
        path: PathBuf,
        /// The underlying parse or encode failure.
        source: serde_json::Error,
    },

    /// Filesystem failure.
    #[error("download I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors arising from unpacking an archive into a directory.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// I/O error reading the archive or writing an entry.
    #[error("unpack I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: String,
    },

    /// An entry of a kind the unpacker does not handle.
    #[error("unsupported archive entry {path} of type {kind}")]
    UnsupportedEntry {
        /// The entry path.
        path: String,
        /// The entry type as reported by the archive.
        kind: String,
    },

    /// The archive holds a symbolic link and the platform cannot create one.
    #[error("this filesystem does not support symlinks: {path}")]
    SymlinksUnsupported {
        /// The link entry path.
        path: String,
    },
}

/// Result type alias using [`DownloadError`].
pub type Result<T> = std::result::Result<T, DownloadError>;
