use super::{Detect, FileAction, base_name, has_suffix};
use crate::content::Content;
use crate::manifest::{Category, Manifest};
use iacscan_common::parent_dir;
use iacscan_common::path::is_within;

/// Finds Helm charts, kustomize directories, and directories of plain
/// Kubernetes manifests.
///
/// Templates inside a Helm chart or a kustomize directory are not plain
/// manifests. Because a chart's `Chart.yaml` may be visited after its
/// templates, that exclusion is applied again in [`Detect::finalize`].
#[derive(Clone, Copy, Debug, Default)]
pub struct KubernetesDetector;

fn is_kustomization(path: &str) -> bool {
    matches!(base_name(path), "kustomization.yaml" | "kustomization.yml")
}

fn is_owned_elsewhere(manifest: &Manifest, dir: &str) -> bool {
    manifest
        .set(Category::HelmCharts)
        .iter()
        .any(|chart| is_within(chart, dir))
        || manifest.set(Category::KustomizeDirectories).contains(dir)
}

/// The chart a subchart at `chart` would belong to, if `chart` sits directly
/// under a `charts/` directory.
fn parent_chart(chart: &str) -> Option<String> {
    let (charts_dir, _) = chart.rsplit_once('/')?;
    match charts_dir.rsplit_once('/') {
        Some((parent, "charts")) => Some(parent.to_owned()),
        None if charts_dir == "charts" => Some(".".to_owned()),
        _ => None,
    }
}

impl Detect for KubernetesDetector {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn detect_file(&mut self, manifest: &mut Manifest, path: &str) -> FileAction {
        if is_kustomization(path) {
            manifest.add(Category::KustomizeDirectories, parent_dir(path));
            return FileAction::Done;
        }
        if has_suffix(path, &[".yaml", ".yml", ".json"]) {
            FileAction::InspectContent
        } else {
            FileAction::Done
        }
    }

    fn detect_content(&mut self, manifest: &mut Manifest, content: &Content<'_>) {
        let document = content.document();
        if document.text("apiVersion").is_none() {
            return;
        }
        let dir = parent_dir(content.path());
        if base_name(content.path()) == "Chart.yaml" {
            manifest.add(Category::HelmCharts, dir);
            return;
        }
        if document.text("kind").is_some() && !is_owned_elsewhere(manifest, &dir) {
            manifest.add(Category::KubernetesManifestDirectories, dir);
        }
    }

    fn finalize(&mut self, manifest: &mut Manifest) {
        let charts = manifest.set(Category::HelmCharts).clone();
        let kustomize = manifest.set(Category::KustomizeDirectories).clone();
        if let Some(dirs) = manifest.set_mut(Category::KubernetesManifestDirectories) {
            dirs.retain(|dir| {
                !kustomize.contains(dir) && !charts.iter().any(|chart| is_within(chart, dir))
            });
        }

        let mut sorted = charts.sorted();
        sorted.retain(|chart| {
            parent_chart(chart).is_none_or(|parent| !charts.contains(&parent))
        });
        if let Some(set) = manifest.set_mut(Category::HelmCharts) {
            set.replace(sorted);
        }
    }
}
