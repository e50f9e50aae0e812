use super::{DirAction, Detect, FileAction, base_name, has_suffix};
use crate::manifest::{Category, Manifest};

/// Recognises CI systems from their configuration directories and files.
#[derive(Clone, Copy, Debug, Default)]
pub struct CiDetector;

const CI_DIRS: [(&str, &str); 4] = [
    (".buildkite", "buildkite"),
    (".circleci", "circleci"),
    (".gitlab", "gitlab"),
    (".drone", "drone"),
];

const CI_FILES: [(&str, &str); 6] = [
    ("Jenkinsfile", "jenkins"),
    ("azure-pipelines.yml", "azure"),
    (".travis.yml", "travis"),
    (".drone.yml", "drone"),
    (".gitlab-ci.yml", "gitlab"),
    ("bitbucket-pipelines.yml", "bitbucket"),
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find_map(|(marker, system)| (*marker == name).then_some(*system))
}

fn is_github_workflow(path: &str) -> bool {
    has_suffix(path, &[".yml", ".yaml"])
        && path
            .rsplit_once('/')
            .is_some_and(|(dir, _)| dir == ".github/workflows" || dir.ends_with("/.github/workflows"))
}

impl Detect for CiDetector {
    fn name(&self) -> &'static str {
        "ci"
    }

    fn detect_dir(&mut self, manifest: &mut Manifest, path: &str) -> DirAction {
        if let Some(system) = lookup(&CI_DIRS, base_name(path)) {
            manifest.add(Category::CiSystems, system);
        }
        DirAction::Continue
    }

    fn detect_file(&mut self, manifest: &mut Manifest, path: &str) -> FileAction {
        if let Some(system) = lookup(&CI_FILES, base_name(path)) {
            manifest.add(Category::CiSystems, system);
        }
        if is_github_workflow(path) {
            manifest.add(Category::CiSystems, "github");
        }
        FileAction::Done
    }
}
