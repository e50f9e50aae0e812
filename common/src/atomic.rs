//! Atomic file replacement.
//!
//! Content is written to a temporary file created in the destination's own
//! directory and renamed over the destination only once it is complete, so
//! readers observe either the previous file or the new one.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writer that stages content in a sibling temporary file.
///
/// Dropping the writer without calling [`AtomicFileWriter::commit`] removes
/// the temporary file and leaves the destination untouched.
///
/// # Examples
///
/// ```
/// use iacscan_common::AtomicFileWriter;
/// use std::io::Write;
///
/// let dir = tempfile::tempdir()?;
/// let target = dir.path().join("meta.json");
/// let mut writer = AtomicFileWriter::new(&target)?;
/// writer.write_all(b"{}")?;
/// writer.commit()?;
/// assert_eq!(std::fs::read_to_string(&target)?, "{}");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct AtomicFileWriter {
    temp: NamedTempFile,
    path: PathBuf,
}

impl AtomicFileWriter {
    /// Creates a temporary file next to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary file cannot be created.
    pub fn new(path: &Path) -> io::Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = path
            .file_name()
            .map_or_else(|| ".tmp".into(), |name| name.to_string_lossy().into_owned());
        let temp = tempfile::Builder::new().prefix(&prefix).tempfile_in(dir)?;
        Ok(Self {
            temp,
            path: path.to_path_buf(),
        })
    }

    /// Flushes the staged content and renames it over the destination.
    ///
    /// # Errors
    ///
    /// Returns an error when flushing or renaming fails. The temporary file
    /// is removed in that case.
    pub fn commit(mut self) -> io::Result<()> {
        self.temp.flush()?;
        self.temp
            .persist(&self.path)
            .map(|_| ())
            .map_err(|err| err.error)
    }
}

impl Write for AtomicFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Replaces `path` with `contents` atomically.
///
/// # Errors
///
/// Returns an error when the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut writer = AtomicFileWriter::new(path)?;
    writer.write_all(contents)?;
    writer.commit()
}
