//! Detectors plugged into the inventory walk.
//!
//! Every detector sees each directory and regular file by its root-relative
//! slash path. Name checks happen immediately; a detector that needs to look
//! inside a file answers [`FileAction::InspectContent`] and is later handed
//! the file head through [`Detect::detect_content`]. Once the walk is done
//! each detector gets a [`Detect::finalize`] pass over the manifest, in
//! registration order.

mod ci;
mod cloudformation;
mod docker;
mod kubernetes;
mod language;
mod terraform;

pub use ci::CiDetector;
pub use cloudformation::CloudFormationDetector;
pub use docker::DockerDetector;
pub use kubernetes::KubernetesDetector;
pub use language::LanguageDetector;
pub use terraform::TerraformDetector;

use crate::content::Content;
use crate::manifest::Manifest;

/// What the walker should do after a directory has been classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirAction {
    /// Descend into the directory.
    #[default]
    Continue,
    /// Skip everything beneath the directory.
    SkipSubtree,
}

/// What the walker should do after a file name has been classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileAction {
    /// The name alone was enough.
    #[default]
    Done,
    /// Read the head of the file and pass it to
    /// [`Detect::detect_content`].
    InspectContent,
}

/// The capabilities a detector may implement.
///
/// All methods except [`Detect::name`] have no-op defaults so a detector
/// implements only what it needs.
pub trait Detect {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Clears transient state before a new walk starts.
    fn reset(&mut self) {}

    /// Classifies a directory by its relative path.
    fn detect_dir(&mut self, _manifest: &mut Manifest, _path: &str) -> DirAction {
        DirAction::Continue
    }

    /// Classifies a regular file by its relative path.
    fn detect_file(&mut self, _manifest: &mut Manifest, _path: &str) -> FileAction {
        FileAction::Done
    }

    /// Inspects the head of a file this detector asked to see.
    fn detect_content(&mut self, _manifest: &mut Manifest, _content: &Content<'_>) {}

    /// Rewrites the manifest once every entry has been visited.
    fn finalize(&mut self, _manifest: &mut Manifest) {}
}

/// The closed family of detectors the walker can run.
#[derive(Clone, Debug)]
pub enum Detector {
    /// CloudFormation templates.
    CloudFormation(CloudFormationDetector),
    /// Helm charts, kustomize directories, and Kubernetes manifests.
    Kubernetes(KubernetesDetector),
    /// CI systems.
    Ci(CiDetector),
    /// Dockerfiles.
    Docker(DockerDetector),
    /// Terraform modules.
    Terraform(TerraformDetector),
    /// Marker-file based language detection.
    Language(LanguageDetector),
}

macro_rules! dispatch {
    ($self:ident, $detector:ident => $body:expr) => {
        match $self {
            Detector::CloudFormation($detector) => $body,
            Detector::Kubernetes($detector) => $body,
            Detector::Ci($detector) => $body,
            Detector::Docker($detector) => $body,
            Detector::Terraform($detector) => $body,
            Detector::Language($detector) => $body,
        }
    };
}

impl Detect for Detector {
    fn name(&self) -> &'static str {
        dispatch!(self, detector => detector.name())
    }

    fn reset(&mut self) {
        dispatch!(self, detector => detector.reset());
    }

    fn detect_dir(&mut self, manifest: &mut Manifest, path: &str) -> DirAction {
        dispatch!(self, detector => detector.detect_dir(manifest, path))
    }

    fn detect_file(&mut self, manifest: &mut Manifest, path: &str) -> FileAction {
        dispatch!(self, detector => detector.detect_file(manifest, path))
    }

    fn detect_content(&mut self, manifest: &mut Manifest, content: &Content<'_>) {
        dispatch!(self, detector => detector.detect_content(manifest, content));
    }

    fn finalize(&mut self, manifest: &mut Manifest) {
        dispatch!(self, detector => detector.finalize(manifest));
    }
}

/// The standard detector family in registration order.
#[must_use]
pub fn default_detectors() -> Vec<Detector> {
    vec![
        Detector::CloudFormation(CloudFormationDetector),
        Detector::Kubernetes(KubernetesDetector),
        Detector::Ci(CiDetector),
        Detector::Docker(DockerDetector),
        Detector::Terraform(TerraformDetector::default()),
        Detector::Language(LanguageDetector::go()),
        Detector::Language(LanguageDetector::python()),
        Detector::Language(LanguageDetector::java_ant_maven()),
        Detector::Language(LanguageDetector::java_gradle()),
        Detector::Language(LanguageDetector::node()),
        Detector::Language(LanguageDetector::ruby()),
        Detector::Language(LanguageDetector::cdk()),
    ]
}

/// The last component of a relative slash path.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub(crate) fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}
