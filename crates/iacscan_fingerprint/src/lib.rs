//! Partial fingerprints: stable per-line identifiers that survive
//! reformatting and small edits elsewhere in a file.
//!
//! The engine runs a rolling hash over a sliding window of the last 100
//! non-whitespace characters and attributes the hash to the line that
//! started the window. Identical hashes within one file are disambiguated
//! with an occurrence counter, so every line yields a distinct value.
//!
//! ```
//! use iacscan_fingerprint::partial;
//!
//! let mut lines = Vec::new();
//! partial("hello\nworld\n".as_bytes(), |line, fp| lines.push((line, fp)))?;
//! assert_eq!(lines.len(), 2);
//! assert_eq!(lines[0].0, 1);
//! # Ok::<(), std::io::Error>(())
//! ```

mod engine;
mod file;
mod runes;

pub use engine::{BLOCK_SIZE, FingerprintLine, partial, partial_lines};
pub use file::{FileFingerprints, SharedLine};
