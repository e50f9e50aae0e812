//! Command implementations.
//!
//! Each command writes its result to the supplied stdout handle so the
//! binary and the tests share one code path.

pub mod assess;
pub mod context;
pub mod download;
pub mod fingerprint;
pub mod inventory;

use crate::ci_env::SystemCommandExecutor;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::Result;
use iacscan_downloader::Manager;
use serde::Serialize;
use std::io::{Read, Write};

/// How a successful run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Success,
    /// An assessment met a failure threshold.
    AssessmentFailed,
}

impl Outcome {
    /// Process exit code for the outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::AssessmentFailed => 2,
        }
    }
}

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns the first error raised by the selected command.
pub fn dispatch(cli: &Cli, config: &Config, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<Outcome> {
    match &cli.command {
        Command::Inventory(args) => inventory::run(args, config, stdout)?,
        Command::Fingerprint(command) => fingerprint::run(command, stdin, stdout)?,
        Command::Assess(args) => return assess::run(args, config, stdout),
        Command::Download(command) => {
            let manager = Manager::new(config.download_root()?)
                .with_latest_release_cache(config.latest_release_cache());
            download::run(command, &manager, stdout)?;
        }
        Command::Context(args) => context::run(args, &SystemCommandExecutor, stdout)?,
    }
    Ok(Outcome::Success)
}

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(out: &mut dyn Write, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
