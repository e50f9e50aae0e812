//! `iacscan context`: print the CI and git context of a directory.

use super::write_json;
use crate::ci_env::{CommandExecutor, capture};
use crate::cli::DirArgs;
use crate::error::Result;
use std::io::Write;

/// Captures the context of `args.dir` and prints it as a JSON object.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn run(args: &DirArgs, executor: &dyn CommandExecutor, out: &mut dyn Write) -> Result<()> {
    let values = capture(args.dir.as_std_path(), executor);
    write_json(out, &values)
}
