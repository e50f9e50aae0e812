//! Local install cache for external scanner binaries and policy bundles.
//!
//! Artifacts come either from a GitHub release, where the asset built for
//! the current platform is picked automatically, or from a plain URL with an
//! explicit version. Each install is unpacked into its own version
//! directory and remembered in a per-artifact `meta.json`.
//!
//! # Modules
//!
//! - [`archive`] - Tar, zip, and bare-executable unpacking
//! - [`error`] - Download and unpack errors
//! - [`github`] - Release lookup over the GitHub REST API
//! - [`manager`] - Install, list, remove, and clean operations
//! - [`meta`] - Persistent install records
//! - [`platform`] - OS and architecture aliases
//! - [`release_matcher`] - Release asset scoring and selection

pub mod archive;
pub mod error;
pub mod github;
pub mod manager;
pub mod meta;
pub mod platform;
pub mod release_matcher;

pub use error::{DownloadError, Result, UnpackError};
pub use manager::{DownloadSpec, Manager};
pub use meta::{Download, DownloadMeta};
