//! Git repository discovery.

use std::io;
use std::path::{Path, PathBuf};

/// Walks up from `dir` looking for a `.git` directory that holds a regular
/// `config` file, returning the absolute path of that `.git` directory.
///
/// Returns `Ok(None)` when the filesystem root is reached without a match.
///
/// # Errors
///
/// Returns an error when `dir` cannot be made absolute.
pub fn find_git_dir(dir: &Path) -> io::Result<Option<PathBuf>> {
    let start = std::path::absolute(dir)?;
    for candidate in start.ancestors() {
        let git_dir = candidate.join(".git");
        if git_dir.is_dir() && git_dir.join("config").is_file() {
            log::trace!("found git directory {}", git_dir.display());
            return Ok(Some(git_dir));
        }
    }
    Ok(None)
}

/// Returns the working tree root of the repository containing `dir`.
///
/// # Errors
///
/// Returns an error when `dir` cannot be made absolute.
pub fn find_repo_root(dir: &Path) -> io::Result<Option<PathBuf>> {
    Ok(find_git_dir(dir)?.and_then(|git_dir| git_dir.parent().map(Path::to_path_buf)))
}
