//! The manifest produced by an inventory walk.

use iacscan_common::StringSet;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};

/// A kind of thing the inventory records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Terraform modules that declare a provider.
    TerraformRootModules,
    /// Every directory holding `.tf` or `.tf.json` files.
    TerraformModules,
    /// CloudFormation template files.
    CloudformationFiles,
    /// Helm chart directories.
    HelmCharts,
    /// Directories holding standalone Kubernetes manifests.
    KubernetesManifestDirectories,
    /// Directories holding a `kustomization.yaml`.
    KustomizeDirectories,
    /// Names of the CI systems in use.
    CiSystems,
    /// Directories holding a Dockerfile.
    DockerDirectories,
    /// Dockerfile paths.
    Dockerfiles,
    /// Go module directories.
    GoDirectories,
    /// Python project directories.
    PythonDirectories,
    /// Node project directories.
    NodeDirectories,
    /// Java project directories.
    JavaDirectories,
    /// Ruby project directories.
    RubyDirectories,
    /// AWS CDK app directories.
    CdkDirectories,
}

impl Category {
    /// Every category in serialisation order.
    pub const ALL: [Self; 15] = [
        Self::TerraformRootModules,
        Self::TerraformModules,
        Self::CloudformationFiles,
        Self::HelmCharts,
        Self::KubernetesManifestDirectories,
        Self::KustomizeDirectories,
        Self::CiSystems,
        Self::DockerDirectories,
        Self::Dockerfiles,
        Self::GoDirectories,
        Self::PythonDirectories,
        Self::NodeDirectories,
        Self::JavaDirectories,
        Self::RubyDirectories,
        Self::CdkDirectories,
    ];

    /// The key used for this category in serialised manifests.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TerraformRootModules => "terraform_root_modules",
            Self::TerraformModules => "terraform_modules",
            Self::CloudformationFiles => "cloudformation_files",
            Self::HelmCharts => "helm_charts",
            Self::KubernetesManifestDirectories => "kubernetes_manifest_directories",
            Self::KustomizeDirectories => "kustomize_directories",
            Self::CiSystems => "ci_systems",
            Self::DockerDirectories => "docker_directories",
            Self::Dockerfiles => "dockerfiles",
            Self::GoDirectories => "go_directories",
            Self::PythonDirectories => "python_directories",
            Self::NodeDirectories => "node_directories",
            Self::JavaDirectories => "java_directories",
            Self::RubyDirectories => "ruby_directories",
            Self::CdkDirectories => "cdk_directories",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Ordered sets of root-relative, slash-separated paths keyed by
/// [`Category`].
///
/// A manifest is filled by a single walk and handed to the caller by value;
/// nothing mutates it afterwards.
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    root: PathBuf,
    sets: [StringSet; 15],
}

impl Manifest {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            sets: Default::default(),
        }
    }

    /// The directory that was walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The set recorded for `category`.
    #[must_use]
    pub fn set(&self, category: Category) -> &StringSet {
        // One slot per category; the fallback is never taken.
        self.sets.get(category.index()).unwrap_or_else(|| empty_set())
    }

    /// Sorted members of the set recorded for `category`.
    #[must_use]
    pub fn sorted(&self, category: Category) -> Vec<String> {
        self.set(category).sorted()
    }

    /// Returns `true` when every set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(StringSet::is_empty)
    }

    /// Compares the contents of two manifests ignoring insertion order.
    #[must_use]
    pub fn same_contents(&self, other: &Self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.sorted(*category) == other.sorted(*category))
    }

    /// Records `value` under `category`, returning `false` when it was
    /// already present.
    pub fn add(&mut self, category: Category, value: impl Into<String>) -> bool {
        self.set_mut(category).is_some_and(|set| set.add(value))
    }

    /// Mutable access to the set for `category`, for finalisation passes.
    pub fn set_mut(&mut self, category: Category) -> Option<&mut StringSet> {
        self.sets.get_mut(category.index())
    }
}

fn empty_set() -> &'static StringSet {
    static EMPTY: std::sync::OnceLock<StringSet> = std::sync::OnceLock::new();
    EMPTY.get_or_init(StringSet::new)
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for category in Category::ALL {
            map.serialize_entry(category.key(), self.set(category))?;
        }
        map.end()
    }
}
