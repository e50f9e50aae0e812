use super::{DirAction, Detect, FileAction, base_name};
use crate::content::Content;
use crate::manifest::{Category, Manifest};
use iacscan_common::parent_dir;
use iacscan_common::path::is_within;
use regex::bytes::Regex;
use std::sync::LazyLock;

static PROVIDER_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?m)^provider\s+""#).ok());

/// Records Terraform modules and promotes those that configure a provider
/// to root modules.
///
/// `.terraform` directories hold downloaded copies of other modules; the
/// detector asks the walker to skip them and remembers them for the rest of
/// the walk.
#[derive(Clone, Debug, Default)]
pub struct TerraformDetector {
    ignored: Vec<String>,
}

impl TerraformDetector {
    fn is_ignored(&self, path: &str) -> bool {
        self.ignored.iter().any(|dir| is_within(dir, path))
    }
}

fn declares_provider(content: &Content<'_>) -> bool {
    if content.path().ends_with(".tf") {
        PROVIDER_BLOCK
            .as_ref()
            .is_some_and(|regex| regex.is_match(content.head()))
    } else {
        content.document().is_container("provider")
    }
}

impl Detect for TerraformDetector {
    fn name(&self) -> &'static str {
        "terraform"
    }

    fn reset(&mut self) {
        self.ignored.clear();
    }

    fn detect_dir(&mut self, _manifest: &mut Manifest, path: &str) -> DirAction {
        if base_name(path) == ".terraform" {
            log::debug!("skipping downloaded modules under {path}");
            self.ignored.push(path.to_owned());
            return DirAction::SkipSubtree;
        }
        DirAction::Continue
    }

    fn detect_file(&mut self, manifest: &mut Manifest, path: &str) -> FileAction {
        if self.is_ignored(path) {
            return FileAction::Done;
        }
        if path.ends_with(".tf") || path.ends_with(".tf.json") {
            manifest.add(Category::TerraformModules, parent_dir(path));
            return FileAction::InspectContent;
        }
        FileAction::Done
    }

    fn detect_content(&mut self, manifest: &mut Manifest, content: &Content<'_>) {
        if declares_provider(content) {
            manifest.add(Category::TerraformRootModules, parent_dir(content.path()));
        }
    }
}
