//! `iacscan assess`: fingerprint findings and apply failure thresholds.
//!
//! The input is either a full assessment object or a bare array of
//! findings, in which case the module is named after the file.

use super::{Outcome, write_json};
use crate::cli::AssessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use camino::Utf8Path;
use iacscan_assessments::{Assessment, FailThresholds, compute_partial_fingerprints};
use iacscan_common::remove_elements_if;
use serde_json::Value;
use std::io::Write;

/// Enriches and evaluates the assessment in `args.findings`, then prints it.
///
/// Thresholds from `--fail` replace those from the configuration file.
///
/// # Errors
///
/// Returns [`CliError::Thresholds`] for invalid thresholds and
/// [`CliError::Findings`] when the input is not an assessment.
pub fn run(args: &AssessArgs, config: &Config, out: &mut dyn Write) -> Result<Outcome> {
    let flags = if args.fail.is_empty() { &config.fail } else { &args.fail };
    let thresholds = FailThresholds::from_flags(flags)?;

    let mut assessment = read_assessment(&args.findings, args.drop_passed)?;
    let dir = args
        .dir
        .as_deref()
        .or_else(|| args.findings.parent())
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    compute_partial_fingerprints(&mut assessment.findings, dir.as_std_path());

    let verdict = assessment.evaluate_failures(&thresholds);
    log::info!(
        "{}: {} of {} findings failing",
        assessment.module,
        assessment.failing_findings(),
        assessment.findings.len()
    );
    write_json(out, &assessment)?;
    Ok(if verdict.failed {
        Outcome::AssessmentFailed
    } else {
        Outcome::Success
    })
}

fn read_assessment(path: &Utf8Path, drop_passed: bool) -> Result<Assessment> {
    let findings_error = |reason: String| CliError::Findings {
        path: path.as_std_path().to_owned(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|err| findings_error(err.to_string()))?;
    let mut value: Value = serde_json::from_str(&text).map_err(|err| findings_error(err.to_string()))?;

    if drop_passed {
        let findings = if value.is_array() {
            Some(&mut value)
        } else {
            value.get_mut("findings")
        };
        if let Some(findings) = findings {
            let dropped = remove_elements_if(findings, |finding| {
                finding.get("pass").and_then(Value::as_bool) == Some(true)
            });
            log::debug!("dropped {dropped} passed findings");
        }
    }

    match value {
        Value::Array(_) => {
            let findings = serde_json::from_value(value).map_err(|err| findings_error(err.to_string()))?;
            let mut assessment = Assessment::new(path.file_stem().unwrap_or_default());
            assessment.findings = findings;
            Ok(assessment)
        }
        Value::Object(_) => serde_json::from_value(value).map_err(|err| findings_error(err.to_string())),
        _ => Err(findings_error("expected an assessment object or an array of findings".to_owned())),
    }
}
