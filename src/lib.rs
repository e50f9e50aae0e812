//! The iacscan command line: inventory, fingerprinting, threshold
//! evaluation, download cache management, and CI context capture.
//!
//! The binary in `main.rs` only parses arguments and maps the outcome to an
//! exit code; everything else lives here so it can be tested.

pub mod ci_env;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use commands::{Outcome, dispatch};
pub use config::Config;
pub use error::{CliError, Result};
