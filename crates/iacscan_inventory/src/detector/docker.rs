use super::{Detect, FileAction, base_name};
use crate::content::Content;
use crate::manifest::{Category, Manifest};
use iacscan_common::parent_dir;

/// Records Dockerfiles and the directories that hold them.
#[derive(Clone, Copy, Debug, Default)]
pub struct DockerDetector;

fn is_dockerfile_name(path: &str) -> bool {
    let base = base_name(path).to_lowercase();
    base == "dockerfile" || base.starts_with("dockerfile.") || base.ends_with(".dockerfile")
}

impl Detect for DockerDetector {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn detect_file(&mut self, _manifest: &mut Manifest, path: &str) -> FileAction {
        if is_dockerfile_name(path) {
            FileAction::InspectContent
        } else {
            FileAction::Done
        }
    }

    fn detect_content(&mut self, manifest: &mut Manifest, content: &Content<'_>) {
        if content.head().windows(5).any(|window| window == b"FROM ") {
            manifest.add(Category::DockerDirectories, parent_dir(content.path()));
            manifest.add(Category::Dockerfiles, content.path());
        }
    }
}
