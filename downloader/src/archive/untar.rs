use super::{UnpackOptions, create_symlink, validate_entry_path, write_file};
use crate::error::UnpackError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tar::EntryType;

/// Unpacks the tarball at `archive` into `dest`.
///
/// # Errors
///
/// See [`untar_reader`].
pub fn untar(archive: &Path, compressed: bool, dest: &Path, options: &UnpackOptions) -> Result<(), UnpackError> {
    let file = BufReader::new(File::open(archive)?);
    untar_reader(file, compressed, dest, options)
}

/// Unpacks a tar stream, optionally gzip-compressed, into `dest`.
///
/// Directories get default permissions and regular files keep the mode
/// recorded in the archive. Extended headers are skipped.
///
/// # Errors
///
/// Returns [`UnpackError::PathTraversal`] for unsafe entry paths,
/// [`UnpackError::UnsupportedEntry`] for entry types other than files,
/// directories and symlinks, and [`UnpackError::SymlinksUnsupported`]
/// when a symlink cannot be created on this platform.
pub fn untar_reader<R: Read>(reader: R, compressed: bool, dest: &Path, options: &UnpackOptions) -> Result<(), UnpackError> {
    if compressed {
        unpack_entries(tar::Archive::new(GzDecoder::new(reader)), dest, options)
    } else {
        unpack_entries(tar::Archive::new(reader), dest, options)
    }
}

fn unpack_entries<R: Read>(mut archive: tar::Archive<R>, dest: &Path, options: &UnpackOptions) -> Result<(), UnpackError> {
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        validate_entry_path(&path)?;
        let target = dest.join(&path);

        match entry.header().entry_type() {
            EntryType::Directory => fs::create_dir_all(&target)?,
            EntryType::Regular | EntryType::Continuous => {
                let mode = entry.header().mode()?;
                write_file(&mut entry, &target, Some(mode), options)?;
            }
            EntryType::Symlink => {
                if options.ignore_symlinks {
                    log::trace!("ignoring symlink {}", path.display());
                    continue;
                }
                let link = entry.link_name()?.ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("symlink {} has no target", path.display()))
                })?;
                create_symlink(&link, &target, &path)?;
            }
            EntryType::XGlobalHeader | EntryType::XHeader => {}
            other => {
                return Err(UnpackError::UnsupportedEntry {
                    path: path.display().to_string(),
                    kind: format!("{other:?}"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_archives::{gzip, tar_bytes};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dest() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn tar_with_link(kind: EntryType) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(0);
        header.set_link_name("bin/tool").expect("link name");
        builder
            .append_data(&mut header, "tool", io::empty())
            .expect("append link");
        builder.into_inner().expect("finish tar")
    }

    #[rstest]
    fn unpacks_gzipped_tarball(dest: TempDir) {
        let bytes = gzip(&tar_bytes(&[("bin/tool", b"binary".as_slice(), 0o755), ("README.md", b"docs".as_slice(), 0o644)]));
        untar_reader(bytes.as_slice(), true, dest.path(), &UnpackOptions::default()).expect("untar");

        assert_eq!(fs::read(dest.path().join("bin/tool")).expect("read tool"), b"binary");
        assert_eq!(fs::read(dest.path().join("README.md")).expect("read readme"), b"docs");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.path().join("bin/tool"))
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[rstest]
    fn truncates_each_file(dest: TempDir) {
        let bytes = tar_bytes(&[("policy.rego", b"package main\ndeny[msg] {}\n".as_slice(), 0o644)]);
        let options = UnpackOptions {
            truncate_file_size: Some(7),
            ..UnpackOptions::default()
        };
        untar_reader(bytes.as_slice(), false, dest.path(), &options).expect("untar");
        assert_eq!(fs::read(dest.path().join("policy.rego")).expect("read"), b"package");
    }

    #[cfg(unix)]
    #[rstest]
    fn creates_symlinks(dest: TempDir) {
        let bytes = tar_with_link(EntryType::Symlink);
        untar_reader(bytes.as_slice(), false, dest.path(), &UnpackOptions::default()).expect("untar");
        let link = fs::read_link(dest.path().join("tool")).expect("read link");
        assert_eq!(link, Path::new("bin/tool"));
    }

    #[rstest]
    fn ignores_symlinks_when_asked(dest: TempDir) {
        let bytes = tar_with_link(EntryType::Symlink);
        let options = UnpackOptions {
            ignore_symlinks: true,
            ..UnpackOptions::default()
        };
        untar_reader(bytes.as_slice(), false, dest.path(), &options).expect("untar");
        assert!(fs::symlink_metadata(dest.path().join("tool")).is_err());
    }

    #[rstest]
    fn hard_links_are_unsupported(dest: TempDir) {
        let bytes = tar_with_link(EntryType::Link);
        let err = untar_reader(bytes.as_slice(), false, dest.path(), &UnpackOptions::default())
            .expect_err("hard link rejected");
        assert!(matches!(err, UnpackError::UnsupportedEntry { ref path, .. } if path == "tool"));
    }
}
