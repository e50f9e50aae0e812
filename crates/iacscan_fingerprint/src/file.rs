//! Per-file fingerprint tables used for display and comparison.

use crate::engine::partial;
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;

/// The text and fingerprint of every line in one file.
#[derive(Clone, Debug, Default)]
pub struct FileFingerprints {
    lines: Vec<String>,
    fingerprints: Vec<Option<String>>,
    line_of: HashMap<String, usize>,
}

/// A fingerprint found in two files, with its line in each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedLine {
    /// The common fingerprint.
    pub fingerprint: String,
    /// 1-based line in the first file.
    pub left_line: usize,
    /// 1-based line in the second file.
    pub right_line: usize,
    /// Text of the line in the first file.
    pub text: String,
}

impl FileFingerprints {
    /// Reads `reader` to the end and fingerprints its lines.
    ///
    /// # Errors
    ///
    /// Returns an error when reading fails.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let lines = split_lines(&data);
        let mut fingerprints = vec![None; lines.len()];
        let mut line_of = HashMap::new();
        partial(data.as_slice(), |line, fingerprint| {
            if let Some(slot) = line.checked_sub(1).and_then(|i| fingerprints.get_mut(i)) {
                *slot = Some(fingerprint.clone());
            }
            line_of.insert(fingerprint, line);
        })?;
        Ok(Self {
            lines,
            fingerprints,
            line_of,
        })
    }

    /// Opens and fingerprints the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or read.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Line texts without their terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Fingerprint of the 1-based `line`, if one was emitted.
    #[must_use]
    pub fn fingerprint(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|i| self.fingerprints.get(i))
            .and_then(Option::as_deref)
    }

    /// Line number that emitted `fingerprint`.
    #[must_use]
    pub fn line_of(&self, fingerprint: &str) -> Option<usize> {
        self.line_of.get(fingerprint).copied()
    }

    /// Iterates over `(line number, fingerprint, text)` in file order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&str>, &str)> {
        self.lines
            .iter()
            .zip(&self.fingerprints)
            .enumerate()
            .map(|(i, (text, fp))| (i + 1, fp.as_deref(), text.as_str()))
    }

    /// Lists the fingerprints present in both `self` and `other`, walking
    /// whichever file has more lines.
    #[must_use]
    pub fn shared_with(&self, other: &Self) -> Vec<SharedLine> {
        let longer = if other.fingerprints.len() > self.fingerprints.len() {
            &other.fingerprints
        } else {
            &self.fingerprints
        };
        longer
            .iter()
            .flatten()
            .filter_map(|fingerprint| {
                let left_line = self.line_of(fingerprint)?;
                let right_line = other.line_of(fingerprint)?;
                let text = left_line
                    .checked_sub(1)
                    .and_then(|i| self.lines.get(i))
                    .cloned()
                    .unwrap_or_default();
                Some(SharedLine {
                    fingerprint: fingerprint.clone(),
                    left_line,
                    right_line,
                    text,
                })
            })
            .collect()
    }
}

/// Splits on `\n`, `\r\n` and a lone `\r`, the terminators the engine
/// counts. A final terminator does not start another line.
fn split_lines(data: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(data);
    let mut lines = Vec::new();
    let mut rest = text.as_ref();
    while !rest.is_empty() {
        let Some(end) = rest.find(['\n', '\r']) else {
            lines.push(rest.to_owned());
            break;
        };
        let (line, tail) = rest.split_at(end);
        lines.push(line.to_owned());
        rest = tail
            .strip_prefix("\r\n")
            .or_else(|| tail.get(1..))
            .unwrap_or_default();
    }
    lines
}
