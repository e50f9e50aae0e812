//! Error types for failure-threshold parsing.
//!
//! Parsing reports every mistake in one pass: each problem becomes a
//! [`ThresholdError`] and the full list is returned as [`ThresholdErrors`].

use std::fmt;
use thiserror::Error;

/// A single problem found in a threshold specification.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ThresholdError {
    /// The entry has an `=` but no severity name before it.
    #[error("threshold must be in form severity=count not {entry}")]
    MissingSeverity {
        /// The rejected entry.
        entry: String,
    },

    /// The severity name is not one of the known levels.
    #[error("unrecognised level: {name}")]
    UnknownSeverity {
        /// The lower-cased name that was supplied.
        name: String,
    },

    /// The count is not a positive decimal integer.
    #[error("invalid threshold {value} for {severity}")]
    InvalidCount {
        /// Severity the count was supplied for.
        severity: String,
        /// The rejected count text.
        value: String,
    },

    /// The count is zero.
    #[error("threshold count for {severity} must be > 0")]
    ZeroCount {
        /// Severity the count was supplied for.
        severity: String,
    },
}

/// Every problem found while parsing a threshold specification.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub struct ThresholdErrors(pub Vec<ThresholdError>);

impl ThresholdErrors {
    /// Returns the individual problems.
    #[must_use]
    pub fn errors(&self) -> &[ThresholdError] {
        &self.0
    }
}

impl fmt::Display for ThresholdErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}
