//! Severity failure thresholds with cascading semantics.
//!
//! A threshold set on one severity is inherited by every more severe level
//! that has no threshold of its own, so `medium=5` also means "five high or
//! critical findings fail the assessment".

use crate::error::{ThresholdError, ThresholdErrors};
use crate::severity::Severity;
use std::collections::BTreeMap;

const UNSET: i64 = -1;

/// Minimum finding counts per severity, after cascading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailThresholds {
    values: [i64; 5],
}

impl Default for FailThresholds {
    fn default() -> Self {
        Self {
            values: [UNSET; 5],
        }
    }
}

impl FailThresholds {
    /// Parses `--fail` style entries: `name=count` or a bare `name`, which
    /// means `name=1`. Names are case-insensitive and a later entry for the
    /// same severity replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns every problem found: entries without a name, unknown
    /// severities, and counts that are zero or not positive integers.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_assessments::{FailThresholds, Severity};
    ///
    /// let thresholds = FailThresholds::from_flags(&["medium=5", "critical=1"])?;
    /// assert_eq!(thresholds.raw(Severity::Low), -1);
    /// assert_eq!(thresholds.raw(Severity::High), 5);
    /// assert_eq!(thresholds.raw(Severity::Critical), 1);
    /// # Ok::<(), iacscan_assessments::ThresholdErrors>(())
    /// ```
    pub fn from_flags<S: AsRef<str>>(flags: &[S]) -> Result<Self, ThresholdErrors> {
        let mut errors = Vec::new();
        let mut specs = BTreeMap::new();
        for flag in flags {
            let flag = flag.as_ref();
            match flag.split_once('=') {
                Some(("", _)) => errors.push(ThresholdError::MissingSeverity {
                    entry: flag.to_owned(),
                }),
                Some((name, value)) => {
                    specs.insert(name.to_lowercase(), value.to_owned());
                }
                None => {
                    specs.insert(flag.to_lowercase(), "1".to_owned());
                }
            }
        }
        Self::cascade(&specs, errors)
    }

    /// Parses a severity-name to count map, as produced by the command line
    /// or a configuration file.
    ///
    /// # Errors
    ///
    /// Returns every unknown severity and every invalid or zero count.
    pub fn parse(specs: &BTreeMap<String, String>) -> Result<Self, ThresholdErrors> {
        let lowered = specs
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.clone()))
            .collect();
        Self::cascade(&lowered, Vec::new())
    }

    fn cascade(
        specs: &BTreeMap<String, String>,
        mut errors: Vec<ThresholdError>,
    ) -> Result<Self, ThresholdErrors> {
        let mut thresholds = Self::default();
        let mut last = UNSET;
        for (severity, slot) in Severity::ALL.iter().zip(thresholds.values.iter_mut()) {
            if let Some(value) = specs.get(severity.as_str()) {
                match value.parse::<u32>() {
                    Ok(0) => errors.push(ThresholdError::ZeroCount {
                        severity: severity.to_string(),
                    }),
                    Ok(count) => last = i64::from(count),
                    Err(_) => errors.push(ThresholdError::InvalidCount {
                        severity: severity.to_string(),
                        value: value.clone(),
                    }),
                }
            }
            *slot = last;
        }
        for name in specs.keys() {
            if name.parse::<Severity>().is_err() {
                errors.push(ThresholdError::UnknownSeverity { name: name.clone() });
            }
        }
        if errors.is_empty() {
            Ok(thresholds)
        } else {
            Err(ThresholdErrors(errors))
        }
    }

    /// The threshold for `severity`, or `None` when none applies.
    #[must_use]
    pub fn threshold(&self, severity: Severity) -> Option<usize> {
        usize::try_from(self.raw(severity))
            .ok()
            .filter(|count| *count > 0)
    }

    /// The stored value for `severity`; `-1` means no threshold.
    #[must_use]
    pub fn raw(&self, severity: Severity) -> i64 {
        self.values.get(severity.index()).copied().unwrap_or(UNSET)
    }

    /// Returns `true` when no severity has a threshold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|value| *value <= 0)
    }

    /// Severity name to stored value, for display.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, i64> {
        Severity::ALL
            .iter()
            .map(|severity| (severity.as_str(), self.raw(*severity)))
            .collect()
    }
}
