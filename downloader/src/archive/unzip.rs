use super::{UnpackOptions, create_symlink, validate_entry_path, write_file};
use crate::error::UnpackError;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Unpacks the zip archive at `archive` into `dest`.
///
/// Directories get default permissions and files keep their recorded Unix
/// mode when the archive carries one. Entries whose mode marks them as
/// symlinks hold the link target as their body.
///
/// # Errors
///
/// Returns [`UnpackError::Zip`] for a malformed archive,
/// [`UnpackError::PathTraversal`] for unsafe entry names and
/// [`UnpackError::SymlinksUnsupported`] when a symlink cannot be created on
/// this platform.
pub fn unzip(archive: &Path, dest: &Path, options: &UnpackOptions) -> Result<(), UnpackError> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    for index in 0..zip.len() {
        let mut file = zip.by_index(index)?;
        let Some(path) = file.enclosed_name() else {
            return Err(UnpackError::PathTraversal {
                path: file.name().to_owned(),
            });
        };
        validate_entry_path(&path)?;
        let target = dest.join(&path);

        if file.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        let mode = file.unix_mode();
        if mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
            if options.ignore_symlinks {
                log::trace!("ignoring symlink {}", path.display());
                continue;
            }
            let mut link = String::new();
            file.read_to_string(&mut link)?;
            create_symlink(&PathBuf::from(link), &target, &path)?;
            continue;
        }
        write_file(&mut file, &target, mode, options)?;
    }
    Ok(())
}
