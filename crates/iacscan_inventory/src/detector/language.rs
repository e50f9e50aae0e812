use super::{Detect, FileAction, base_name};
use crate::manifest::{Category, Manifest};
use crate::nesting::collapse_nested_dirs;
use iacscan_common::parent_dir;

/// Records the directories that contain one of a set of marker files.
///
/// With `collapse_nested` set, finalisation keeps only the outermost
/// directory of each nested group, so a multi-module build is reported once.
#[derive(Clone, Debug)]
pub struct LanguageDetector {
    name: &'static str,
    category: Category,
    markers: &'static [&'static str],
    collapse_nested: bool,
}

impl LanguageDetector {
    /// Creates a detector recording marker directories in `category`.
    #[must_use]
    pub const fn new(
        name: &'static str,
        category: Category,
        markers: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            category,
            markers,
            collapse_nested: false,
        }
    }

    /// Collapses nested marker directories when the walk finishes.
    #[must_use]
    pub const fn collapsing(mut self) -> Self {
        self.collapse_nested = true;
        self
    }

    /// Go modules.
    #[must_use]
    pub const fn go() -> Self {
        Self::new("go", Category::GoDirectories, &["go.mod"])
    }

    /// Pipenv and pip projects.
    #[must_use]
    pub const fn python() -> Self {
        Self::new(
            "python",
            Category::PythonDirectories,
            &["Pipfile", "requirements.txt"],
        )
    }

    /// Ant and Maven builds, collapsed to the outermost build.
    #[must_use]
    pub const fn java_ant_maven() -> Self {
        Self::new(
            "java",
            Category::JavaDirectories,
            &["pom.xml", "build.xml", "build.gradle"],
        )
        .collapsing()
    }

    /// Gradle builds.
    #[must_use]
    pub const fn java_gradle() -> Self {
        Self::new("java-gradle", Category::JavaDirectories, &["build.gradle"])
    }

    /// npm and yarn projects.
    #[must_use]
    pub const fn node() -> Self {
        Self::new(
            "node",
            Category::NodeDirectories,
            &["package-lock.json", "yarn.lock"],
        )
    }

    /// Bundler projects.
    #[must_use]
    pub const fn ruby() -> Self {
        Self::new("ruby", Category::RubyDirectories, &["Gemfile"])
    }

    /// AWS CDK apps.
    #[must_use]
    pub const fn cdk() -> Self {
        Self::new("cdk", Category::CdkDirectories, &["cdk.json"])
    }
}

impl Detect for LanguageDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect_file(&mut self, manifest: &mut Manifest, path: &str) -> FileAction {
        let base = base_name(path);
        if self.markers.iter().any(|marker| *marker == base) {
            manifest.add(self.category, parent_dir(path));
        }
        FileAction::Done
    }

    fn finalize(&mut self, manifest: &mut Manifest) {
        if !self.collapse_nested {
            return;
        }
        if let Some(set) = manifest.set_mut(self.category) {
            collapse_nested_dirs(set);
        }
    }
}
