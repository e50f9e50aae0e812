use super::{Detect, FileAction, has_suffix};
use crate::content::Content;
use crate::manifest::{Category, Manifest};

/// Records YAML and JSON files that declare `AWSTemplateFormatVersion`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloudFormationDetector;

impl Detect for CloudFormationDetector {
    fn name(&self) -> &'static str {
        "cloudformation"
    }

    fn detect_file(&mut self, _manifest: &mut Manifest, path: &str) -> FileAction {
        if has_suffix(path, &[".yaml", ".yml", ".json"]) {
            FileAction::InspectContent
        } else {
            FileAction::Done
        }
    }

    fn detect_content(&mut self, manifest: &mut Manifest, content: &Content<'_>) {
        if content.document().contains("AWSTemplateFormatVersion") {
            manifest.add(Category::CloudformationFiles, content.path());
        }
    }
}
