//! Unpacking downloaded release files into an install directory.
//!
//! Entry paths are validated before anything is written so that an archive
//! cannot place files outside the destination.

mod options;
mod untar;
mod unzip;

pub use options::UnpackOptions;
pub use untar::{untar, untar_reader};
pub use unzip::unzip;

use crate::error::UnpackError;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path};

/// How a downloaded file is turned into an install directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// An uncompressed tarball.
    Tar,
    /// A gzip-compressed tarball (`.tar.gz` or `.tgz`).
    TarGz,
    /// A zip archive.
    Zip,
    /// A bare executable, copied as is.
    Executable,
}

impl ArchiveFormat {
    /// Classifies a downloaded file by its base name.
    ///
    /// Names without any dot, and `.exe` names, are bare executables.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_downloader::archive::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_file_name("tool.tgz"), Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_file_name("tool_linux_amd64"), Some(ArchiveFormat::Executable));
    /// assert_eq!(ArchiveFormat::from_file_name("tool.deb"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if file_name.ends_with(".tar") {
            Some(Self::Tar)
        } else if file_name.ends_with(".zip") {
            Some(Self::Zip)
        } else if !file_name.contains('.') || file_name.ends_with(".exe") {
            Some(Self::Executable)
        } else {
            None
        }
    }
}

/// Unpacks `archive` into `dest`, which must already exist.
///
/// [`ArchiveFormat::Executable`] copies the file to `dest/<exe_name>` and
/// marks it executable.
///
/// # Errors
///
/// Returns [`UnpackError`] when the archive cannot be read, an entry is
/// unsafe or unsupported, or a file cannot be written.
pub fn unpack(
    format: ArchiveFormat,
    archive: &Path,
    dest: &Path,
    exe_name: &str,
    options: &UnpackOptions,
) -> Result<(), UnpackError> {
    match format {
        ArchiveFormat::Tar => untar(archive, false, dest, options),
        ArchiveFormat::TarGz => untar(archive, true, dest, options),
        ArchiveFormat::Zip => unzip(archive, dest, options),
        ArchiveFormat::Executable => {
            let mut source = File::open(archive)?;
            write_file(&mut source, &dest.join(exe_name), Some(0o755), &UnpackOptions::default())
        }
    }
}

/// Rejects entry paths that are absolute or climb out via `..`.
pub(crate) fn validate_entry_path(path: &Path) -> Result<(), UnpackError> {
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(UnpackError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Writes one regular file, creating parent directories as needed.
pub(crate) fn write_file<R>(
    reader: &mut R,
    target: &Path,
    mode: Option<u32>,
    options: &UnpackOptions,
) -> Result<(), UnpackError>
where
    R: Read + ?Sized,
{
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(target)?;
    options.copy(reader, &mut file)?;
    set_mode(target, mode)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(target: &Path, mode: Option<u32>) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => fs::set_permissions(target, fs::Permissions::from_mode(mode & 0o7777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn set_mode(_target: &Path, _mode: Option<u32>) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
pub(crate) fn create_symlink(link_target: &Path, at: &Path, _entry: &Path) -> Result<(), UnpackError> {
    if let Some(parent) = at.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(link_target, at)?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn create_symlink(_link_target: &Path, _at: &Path, entry: &Path) -> Result<(), UnpackError> {
    Err(UnpackError::SymlinksUnsupported {
        path: entry.display().to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_archives {
    //! In-memory archive builders shared by the unpacker tests.

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::path::Path;

    /// A tar entry to append: path, body, mode.
    pub(crate) type TarFile<'a> = (&'a str, &'a [u8], u32);

    pub(crate) fn tar_bytes(files: &[TarFile<'_>]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, body, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(*mode);
            header.set_entry_type(tar::EntryType::Regular);
            builder.append_data(&mut header, path, *body).expect("append");
        }
        builder.into_inner().expect("finish tar")
    }

    pub(crate) fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).expect("compress");
        encoder.finish().expect("finish gzip")
    }

    pub(crate) fn zip_file(path: &Path, files: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).expect("create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in files {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, zip::write::SimpleFileOptions::default())
                    .expect("add dir");
                continue;
            }
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default().unix_permissions(0o644))
                .expect("start file");
            writer.write_all(body).expect("write entry");
        }
        writer.finish().expect("finish zip");
    }
}
