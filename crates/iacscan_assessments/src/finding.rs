//! The normalised finding record.

use crate::severity::Severity;
use iacscan_common::truncate_right;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TITLE_WIDTH: usize = 57;

/// One result reported by a scanner, mapped into a common shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Stable rule identifier reported by the scanner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Severity of the finding.
    pub severity: Severity,
    /// Short title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Rendered markdown detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Path of the offending file, relative to the scanned directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// 1-based line within `file_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// `true` when the check passed.
    #[serde(default)]
    pub pass: bool,
    /// `true` when the file was produced by a tool rather than checked in.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generated_file: bool,
    /// Path of the file relative to the enclosing repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    /// Partial fingerprint of `line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_fingerprint: Option<String>,
    /// Tool-specific attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tool: BTreeMap<String, String>,
}

impl Finding {
    /// Creates a failing finding with the given severity and title.
    #[must_use]
    pub fn new(severity: Severity, title: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the file location of the finding.
    #[must_use]
    pub fn at(mut self, file_path: impl Into<String>, line: usize) -> Self {
        self.file_path = Some(file_path.into());
        self.line = Some(line);
        self
    }

    /// Records a tool-specific attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tool.insert(name.into(), value.into());
        self
    }

    /// The title, or a one-line excerpt of the description when the
    /// scanner did not supply one.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_assessments::{Finding, Severity};
    ///
    /// let mut finding = Finding::new(Severity::Low, "");
    /// finding.description = "S3 bucket allows\npublic reads".to_owned();
    /// assert_eq!(finding.display_title(), "S3 bucket allows public reads");
    /// ```
    #[must_use]
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            truncate_right(&self.description, TITLE_WIDTH)
        } else {
            self.title.clone()
        }
    }
}
