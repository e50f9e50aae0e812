//! Inventory of a source tree.
//!
//! A single walk over a directory visits every regular file and directory
//! once and hands each one to a fixed family of detectors. Detectors look at
//! names, and optionally at the first few kilobytes of content, and record
//! what they recognise in a [`Manifest`]: Terraform modules, CloudFormation
//! templates, Kubernetes manifests, Helm charts, Dockerfiles, CI systems,
//! and per-language source directories.
//!
//! ```no_run
//! use iacscan_inventory::{Category, scan};
//!
//! let manifest = scan(std::path::Path::new("."));
//! for module in manifest.set(Category::TerraformRootModules) {
//!     println!("{module}");
//! }
//! ```

mod cache;
mod content;
pub mod detector;
mod manifest;
mod nesting;
mod walker;

pub use cache::{DEFAULT_CAPACITY, InventoryCache};
pub use content::{Content, Document, Field};
pub use detector::{Detect, DirAction, Detector, FileAction, default_detectors};
pub use manifest::{Category, Manifest};
pub use nesting::collapse_nested_dirs;
pub use walker::{DEFAULT_BUFFER_SIZE, Walker, scan};
