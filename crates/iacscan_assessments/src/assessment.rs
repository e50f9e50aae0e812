//! Assessments and their failure verdicts.

use crate::finding::Finding;
use crate::severity::Severity;
use crate::thresholds::FailThresholds;
use serde::{Deserialize, Serialize};

/// The findings of one scanner run plus the verdict derived from them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Name of the scanner module that produced the findings.
    #[serde(default)]
    pub module: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Category such as `iac` or `secrets`.
    #[serde(default)]
    pub category: String,
    /// Rendered markdown summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Normalised findings.
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Set by [`Assessment::evaluate_failures`].
    #[serde(default)]
    pub failed: bool,
    /// Number of findings that tripped the threshold.
    #[serde(default)]
    pub failed_count: usize,
    /// Severity whose threshold was tripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_severity: Option<Severity>,
}

/// Outcome of evaluating thresholds against an assessment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    /// `true` when some threshold was met.
    pub failed: bool,
    /// The least severe level whose threshold was met.
    pub severity: Option<Severity>,
    /// Failing findings at or above `severity`.
    pub count: usize,
}

impl Verdict {
    /// Computes the verdict for `findings`.
    ///
    /// Only failing findings count. For each severity the count includes
    /// every failing finding of that severity or higher, and severities are
    /// tried from least to most severe; the first whose threshold is met
    /// decides the verdict.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_assessments::{FailThresholds, Finding, Severity, Verdict};
    ///
    /// let thresholds = FailThresholds::from_flags(&["medium=5", "critical=1"])?;
    /// let findings = vec![Finding::new(Severity::High, "x"); 6];
    /// let verdict = Verdict::evaluate(&findings, &thresholds);
    /// assert!(verdict.failed);
    /// assert_eq!(verdict.severity, Some(Severity::Medium));
    /// assert_eq!(verdict.count, 6);
    /// # Ok::<(), iacscan_assessments::ThresholdErrors>(())
    /// ```
    #[must_use]
    pub fn evaluate(findings: &[Finding], thresholds: &FailThresholds) -> Self {
        let mut counts = [0_usize; 5];
        for finding in findings.iter().filter(|finding| !finding.pass) {
            if let Some(slot) = counts.get_mut(finding.severity.index()) {
                *slot += 1;
            }
        }
        for severity in Severity::ALL {
            let at_or_above: usize = counts.iter().skip(severity.index()).sum();
            if let Some(threshold) = thresholds.threshold(severity)
                && at_or_above >= threshold
            {
                return Self {
                    failed: true,
                    severity: Some(severity),
                    count: at_or_above,
                };
            }
        }
        Self::default()
    }
}

impl Assessment {
    /// Creates an empty assessment for `module`.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    /// Evaluates `thresholds` and records the verdict on the assessment.
    pub fn evaluate_failures(&mut self, thresholds: &FailThresholds) -> Verdict {
        let verdict = Verdict::evaluate(&self.findings, thresholds);
        self.failed = verdict.failed;
        self.failed_count = verdict.count;
        self.failed_severity = verdict.severity;
        if verdict.failed {
            log::info!(
                "{} failed: {} findings at {} or above",
                self.module,
                verdict.count,
                verdict.severity.map_or("", Severity::as_str)
            );
        }
        verdict
    }

    /// Number of failing findings.
    #[must_use]
    pub fn failing_findings(&self) -> usize {
        self.findings.iter().filter(|finding| !finding.pass).count()
    }
}
