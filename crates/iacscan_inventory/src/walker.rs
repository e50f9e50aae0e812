//! The single-pass directory walk.

use crate::content::Content;
use crate::detector::{Detect, DirAction, Detector, FileAction, default_detectors};
use crate::manifest::Manifest;
use iacscan_common::relative_slash_path;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bytes read from the start of a file for content inspection.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Walks a directory tree once and dispatches every entry to its detectors.
///
/// Symbolic links are not followed and `.git` directories are never
/// entered. Unreadable entries are logged and skipped, so a walk always
/// produces a manifest; an unreadable root simply yields an empty one.
#[derive(Debug)]
pub struct Walker {
    detectors: Vec<Detector>,
    buffer: Vec<u8>,
    interested: Vec<usize>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new(default_detectors())
    }
}

impl Walker {
    /// Creates a walker that dispatches to `detectors` in the given order.
    #[must_use]
    pub fn new(detectors: Vec<Detector>) -> Self {
        Self {
            detectors,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            interested: Vec::new(),
        }
    }

    /// Sets how many bytes are read from each inspected file.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer = vec![0; size.max(1)];
        self
    }

    /// Walks `root` and returns the populated manifest.
    pub fn walk(&mut self, root: &Path) -> Manifest {
        let root = absolute_root(root);
        let mut manifest = Manifest::new(&root);
        for detector in &mut self.detectors {
            detector.reset();
        }

        let mut entries = WalkDir::new(&root).follow_links(false).into_iter();
        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root.as_path()).display().to_string();
                    log::warn!("could not scan {path}: {err}");
                    continue;
                }
            };
            let Some(rel) = relative_slash_path(&root, entry.path()) else {
                continue;
            };
            let file_type = entry.file_type();
            if file_type.is_dir() {
                if entry.depth() > 0 && entry.file_name() == ".git" {
                    entries.skip_current_dir();
                    continue;
                }
                if self.visit_dir(&mut manifest, &rel) == DirAction::SkipSubtree {
                    entries.skip_current_dir();
                }
            } else if file_type.is_file() {
                self.visit_file(&mut manifest, entry.path(), &rel);
            }
        }

        for detector in &mut self.detectors {
            detector.finalize(&mut manifest);
        }
        log::debug!("inventory of {} complete", root.display());
        manifest
    }

    fn visit_dir(&mut self, manifest: &mut Manifest, rel: &str) -> DirAction {
        let mut action = DirAction::Continue;
        for detector in &mut self.detectors {
            if detector.detect_dir(manifest, rel) == DirAction::SkipSubtree {
                log::trace!("{} skips {rel}", detector.name());
                action = DirAction::SkipSubtree;
            }
        }
        action
    }

    fn visit_file(&mut self, manifest: &mut Manifest, path: &Path, rel: &str) {
        self.interested.clear();
        for (index, detector) in self.detectors.iter_mut().enumerate() {
            if detector.detect_file(manifest, rel) == FileAction::InspectContent {
                self.interested.push(index);
            }
        }
        if self.interested.is_empty() {
            return;
        }

        let len = match read_head(path, &mut self.buffer) {
            Ok(len) => len,
            Err(err) => {
                log::warn!("could not read {}: {err}", path.display());
                return;
            }
        };
        if len == 0 {
            return;
        }
        let content = Content::new(rel, self.buffer.get(..len).unwrap_or_default());
        for index in &self.interested {
            if let Some(detector) = self.detectors.get_mut(*index) {
                detector.detect_content(manifest, &content);
            }
        }
    }
}

/// Walks `root` with the standard detectors.
///
/// # Examples
///
/// ```no_run
/// use iacscan_inventory::{Category, scan};
///
/// let manifest = scan(std::path::Path::new("infra"));
/// let charts = manifest.sorted(Category::HelmCharts);
/// ```
#[must_use]
pub fn scan(root: &Path) -> Manifest {
    Walker::default().walk(root)
}

fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

/// Fills `buf` from the start of the file, stopping early only at end of
/// file.
fn read_head(path: &Path, buf: &mut [u8]) -> io::Result<usize> {
    let mut file = File::open(path)?;
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match file.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DockerDetector;
    use crate::manifest::Category;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn tree() -> TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        for (path, contents) in [
            ("mod/main.tf", "provider \"aws\" {}\n"),
            (".git/config", ""),
            (".git/hooks/Dockerfile", "FROM scratch\n"),
            ("empty/Dockerfile", ""),
        ] {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(path, contents).expect("write");
        }
        dir
    }

    #[rstest]
    fn git_directories_are_not_entered(tree: TempDir) {
        let manifest = Walker::new(vec![Detector::Docker(DockerDetector)]).walk(tree.path());
        assert!(manifest.set(Category::Dockerfiles).is_empty());
    }

    #[rstest]
    fn empty_files_skip_content_inspection(tree: TempDir) {
        fs::write(tree.path().join("empty/.keep.yaml"), "").expect("write");
        let manifest = scan(tree.path());
        assert!(manifest.set(Category::DockerDirectories).is_empty());
        assert!(manifest.set(Category::CloudformationFiles).is_empty());
    }

    #[rstest]
    fn walking_twice_yields_the_same_manifest(tree: TempDir) {
        let mut walker = Walker::default();
        let first = walker.walk(tree.path());
        let second = walker.walk(tree.path());
        assert!(first.same_contents(&second));
        assert_eq!(first.sorted(Category::TerraformModules), ["mod"]);
    }

    #[rstest]
    fn zero_detectors_yield_an_empty_manifest(tree: TempDir) {
        let manifest = Walker::new(Vec::new()).walk(tree.path());
        assert!(manifest.is_empty());
    }

    #[rstest]
    fn missing_root_yields_an_empty_manifest(tree: TempDir) {
        let manifest = scan(&tree.path().join("does-not-exist"));
        assert!(manifest.is_empty());
    }

    #[rstest]
    fn relative_paths_use_the_root_as_dot(tree: TempDir) {
        fs::write(tree.path().join("go.mod"), "module x\n").expect("go.mod");
        let manifest = scan(tree.path());
        assert_eq!(manifest.sorted(Category::GoDirectories), ["."]);
        assert_eq!(manifest.sorted(Category::TerraformRootModules), ["mod"]);
    }

    #[rstest]
    fn head_reads_stop_at_the_buffer_size(tree: TempDir) {
        let path = tree.path().join("big.json");
        fs::write(&path, vec![b'x'; 10_000]).expect("write");
        let mut buf = vec![0; 16];
        assert_eq!(read_head(&path, &mut buf).expect("read"), 16);
    }
}
