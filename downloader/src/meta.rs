//! Persistent records of installed artifacts.
//!
//! One `meta.json` per artifact name holds every installed version plus the
//! last resolved "latest" version. Field names are PascalCase on disk.

use crate::github::is_latest_tag;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How many hours a resolved "latest" version is trusted by default.
pub const DEFAULT_LATEST_CACHE_HOURS: i64 = 24;

/// One installed version of an artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Download {
    /// Artifact name.
    pub name: String,
    /// Installed version.
    pub version: String,
    /// Where the artifact was fetched from.
    #[serde(rename = "URL")]
    pub url: String,
    /// Install directory.
    pub dir: PathBuf,
    /// When the install finished.
    pub install_time: DateTime<Utc>,
}

impl Download {
    /// Locates `relative` inside the install directory.
    ///
    /// Many archives wrap their contents in a single top-level directory, so
    /// when `relative` is missing at the top level the immediate
    /// subdirectories are searched too. Falls back to the top-level path.
    #[must_use]
    pub fn exe_path(&self, relative: &str) -> PathBuf {
        let exe = self.dir.join(relative);
        if exe.exists() {
            return exe;
        }
        match fs::read_dir(&self.dir) {
            Ok(entries) => entries
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
                .map(|entry| entry.path().join(relative))
                .find(|nested| nested.exists())
                .unwrap_or(exe),
            Err(err) => {
                log::warn!("could not read {}: {err}", self.dir.display());
                exe
            }
        }
    }
}

/// Every installed version of one artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DownloadMeta {
    /// Artifact name.
    pub name: String,
    /// The most recently resolved "latest" version.
    #[serde(default)]
    pub latest_version: String,
    /// When [`DownloadMeta::latest_version`] was resolved; `null` until the
    /// first check.
    #[serde(default)]
    pub latest_check_time: Option<DateTime<Utc>>,
    /// Installed versions in install order.
    #[serde(default)]
    pub installed: Vec<Download>,
    /// Directory holding every version of this artifact.
    pub dir: PathBuf,
}

impl DownloadMeta {
    /// An empty record for `name` rooted at `dir`.
    #[must_use]
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            latest_version: String::new(),
            latest_check_time: None,
            installed: Vec::new(),
            dir: dir.into(),
        }
    }

    /// Finds an installed version that satisfies `version`.
    ///
    /// "latest" resolves through the remembered latest version, which is
    /// trusted for `max_age` unless `stale` accepts any age.
    #[must_use]
    pub fn find_version(&self, version: &str, max_age: TimeDelta, stale: bool) -> Option<&Download> {
        if !is_latest_tag(version) {
            return self.find_version_exactly(version);
        }
        if self.latest_version.is_empty() {
            return None;
        }
        let fresh = self
            .latest_check_time
            .is_some_and(|checked| checked > Utc::now() - max_age);
        if stale || fresh {
            log::debug!("using cached latest version {} of {}", self.latest_version, self.name);
            self.find_version_exactly(&self.latest_version)
        } else {
            None
        }
    }

    /// Finds the record for exactly `version` whose directory still exists.
    #[must_use]
    pub fn find_version_exactly(&self, version: &str) -> Option<&Download> {
        let download = self.installed.iter().find(|d| d.version == version)?;
        if download.dir.exists() {
            Some(download)
        } else {
            log::warn!("{} is no longer accessible", download.dir.display());
            None
        }
    }

    /// Remembers `actual` as the latest version when `requested` asked for
    /// the latest, and returns the matching install if there is one.
    pub fn update_latest_info(&mut self, requested: &str, actual: &str) -> Option<Download> {
        if !is_latest_tag(requested) {
            return None;
        }
        self.latest_version = actual.to_owned();
        self.latest_check_time = Some(Utc::now());
        log::debug!("latest release of {} is {actual}", self.name);
        self.find_version_exactly(actual).cloned()
    }

    /// Drops every record of `version`.
    pub fn remove_installed_version(&mut self, version: &str) {
        self.installed.retain(|d| d.version != version);
    }

    /// The install of the remembered latest version, or else the most
    /// recently installed version.
    #[must_use]
    pub fn find_latest_or_last_installed(&self) -> Option<&Download> {
        if !self.latest_version.is_empty() {
            return self.find_version_exactly(&self.latest_version);
        }
        self.installed.iter().max_by_key(|d| d.install_time)
    }

    /// Path of the `meta.json` file for this artifact.
    #[must_use]
    pub fn meta_path(&self) -> PathBuf {
        meta_path(&self.dir)
    }
}

pub(crate) fn meta_path(name_dir: &Path) -> PathBuf {
    name_dir.join("meta.json")
}

/// Makes a version string safe to use as a directory name.
///
/// # Examples
///
/// ```
/// use iacscan_downloader::meta::sanitize_version;
///
/// assert_eq!(sanitize_version("v1.2.3"), "v1.2.3");
/// assert_eq!(sanitize_version("../release/1"), "__release_1");
/// ```
#[must_use]
pub fn sanitize_version(version: &str) -> String {
    let mut sanitized = String::with_capacity(version.len());
    let mut rest = version;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("..") {
            sanitized.push('_');
            rest = tail;
            continue;
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some('/' | '\\') => sanitized.push('_'),
            Some(c) => sanitized.push(c),
            None => break,
        }
        rest = chars.as_str();
    }
    sanitized
}
