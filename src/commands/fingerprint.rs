//! `iacscan fingerprint`: display and compare partial fingerprints.

use crate::cli::FingerprintCommand;
use crate::error::Result;
use camino::Utf8PathBuf;
use iacscan_fingerprint::FileFingerprints;
use std::io::{Read, Write};

/// Runs a fingerprint subcommand. `show` without files reads `stdin`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or the output cannot be
/// written.
pub fn run(command: &FingerprintCommand, stdin: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    match command {
        FingerprintCommand::Show { files } if files.is_empty() => {
            show(&FileFingerprints::from_reader(stdin)?, out)
        }
        FingerprintCommand::Show { files } => {
            for file in files {
                show(&FileFingerprints::from_path(file.as_std_path())?, out)?;
            }
            Ok(())
        }
        FingerprintCommand::Diff { left, right } => diff(left, right, out),
    }
}

fn show(fingerprints: &FileFingerprints, out: &mut dyn Write) -> Result<()> {
    for (_, fingerprint, text) in fingerprints.iter() {
        writeln!(out, "{} {text}", fingerprint.unwrap_or_default())?;
    }
    Ok(())
}

fn diff(left: &Utf8PathBuf, right: &Utf8PathBuf, out: &mut dyn Write) -> Result<()> {
    let a = FileFingerprints::from_path(left.as_std_path())?;
    let b = FileFingerprints::from_path(right.as_std_path())?;
    let longest = a.lines().len().max(b.lines().len());
    let width = longest.to_string().len();
    writeln!(out, "A {left}")?;
    writeln!(out, "B {right}")?;
    for shared in a.shared_with(&b) {
        writeln!(
            out,
            "{} A:{:<width$} B:{:<width$} {}",
            shared.fingerprint, shared.left_line, shared.right_line, shared.text
        )?;
    }
    Ok(())
}
