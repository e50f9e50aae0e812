//! The on-disk download cache.
//!
//! Layout under the manager root:
//!
//! ```text
//! <root>/<name>/meta.json
//! <root>/<name>/<version>/...
//! ```
//!
//! Metadata is rewritten atomically after every change and only once the
//! new version has been unpacked, so a failed install leaves the previous
//! record intact.

use crate::archive::{self, ArchiveFormat, UnpackOptions};
use crate::error::{DownloadError, Result};
use crate::github::{GithubRepo, HttpReleaseClient, ReleaseClient, is_latest_tag};
use crate::meta::{DEFAULT_LATEST_CACHE_HOURS, Download, DownloadMeta, meta_path, sanitize_version};
use crate::release_matcher::{AssetMatcher, DefaultMatcher, choose_asset};
use chrono::{TimeDelta, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What to install.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadSpec {
    /// Name to file the artifact under. Ignored for GitHub repositories,
    /// which are filed as `<owner>-<repo>`.
    pub name: Option<String>,
    /// A version or tag; empty or `latest` for the newest release.
    pub version: String,
    /// `github.com/<owner>/<repo>` or a direct download URL.
    pub url: Option<String>,
    /// How long a resolved "latest" version is trusted.
    pub latest_release_cache: Option<TimeDelta>,
}

impl DownloadSpec {
    /// A spec for the newest release of a GitHub repository.
    #[must_use]
    pub fn github(repo: &str) -> Self {
        Self {
            url: Some(repo.to_owned()),
            ..Self::default()
        }
    }

    /// Pins the spec to `version`.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    fn github_repo(&self) -> Option<GithubRepo> {
        self.url.as_deref().and_then(GithubRepo::parse)
    }

    fn artifact_name(&self) -> Result<String> {
        if let Some(repo) = self.github_repo() {
            return Ok(repo.name());
        }
        self.name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(DownloadError::NameRequired)
    }
}

/// Installs, lists, and removes artifacts under a root directory.
pub struct Manager<C = HttpReleaseClient> {
    root: PathBuf,
    client: C,
    matcher: Box<dyn AssetMatcher + Send + Sync>,
    latest_release_cache: TimeDelta,
}

impl Manager<HttpReleaseClient> {
    /// A manager fetching from GitHub, authenticated by `GITHUB_TOKEN` when
    /// set.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_client(root, HttpReleaseClient::from_env())
    }
}

impl<C: ReleaseClient> Manager<C> {
    /// A manager fetching through `client`.
    #[must_use]
    pub fn with_client(root: impl Into<PathBuf>, client: C) -> Self {
        Self {
            root: root.into(),
            client,
            matcher: Box::new(DefaultMatcher::default()),
            latest_release_cache: TimeDelta::hours(DEFAULT_LATEST_CACHE_HOURS),
        }
    }

    /// Replaces the release asset matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl AssetMatcher + Send + Sync + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Sets how long a resolved "latest" version is trusted when a spec
    /// does not say.
    #[must_use]
    pub fn with_latest_release_cache(mut self, cache: TimeDelta) -> Self {
        self.latest_release_cache = cache;
        self
    }

    /// The cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every readable artifact record, sorted by name.
    ///
    /// Unreadable records are logged and skipped.
    #[must_use]
    pub fn list(&self) -> Vec<DownloadMeta> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                log::warn!("could not read {}: {err}", self.root.display());
                return Vec::new();
            }
        };
        let mut metas: Vec<DownloadMeta> = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
            .filter_map(|entry| match read_meta(&meta_path(&entry.path())) {
                Ok(meta) => meta,
                Err(err) => {
                    log::warn!("{err}");
                    None
                }
            })
            .collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        metas
    }

    /// The record for `name`, if it has ever been installed.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Metadata`] if the record is not valid JSON.
    pub fn meta(&self, name: &str) -> Result<Option<DownloadMeta>> {
        read_meta(&meta_path(&self.root.join(name)))
    }

    /// The installed `version` of `name`, or the latest-or-last installed
    /// version when `version` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotInstalled`] when nothing matches.
    pub fn installed(&self, name: &str, version: Option<&str>) -> Result<Download> {
        let not_installed = || DownloadError::NotInstalled { name: name.to_owned() };
        let meta = self.meta(name)?.ok_or_else(not_installed)?;
        let found = match version {
            Some(version) => meta.find_version(version, self.latest_release_cache, true),
            None => meta.find_latest_or_last_installed(),
        };
        found.cloned().ok_or_else(not_installed)
    }

    /// Installs `spec`, reusing an existing install of the same version.
    ///
    /// # Errors
    ///
    /// Returns an error when the spec is incomplete, the release or asset
    /// cannot be resolved, or the download or unpack fails.
    pub fn install(&self, spec: &DownloadSpec) -> Result<Download> {
        let name = spec.artifact_name()?;
        let mut meta = self
            .meta(&name)?
            .unwrap_or_else(|| DownloadMeta::new(name.as_str(), self.root.join(&name)));
        let cache = spec.latest_release_cache.unwrap_or(self.latest_release_cache);
        if let Some(existing) = meta.find_version(&spec.version, cache, false) {
            log::debug!("{name} {} is already installed", existing.version);
            return Ok(existing.clone());
        }

        let (version, url, exe_name) = match spec.github_repo() {
            Some(repo) => {
                let release = if is_latest_tag(&spec.version) {
                    self.client.latest_release(&repo.owner, &repo.repo)?
                } else {
                    self.client.release_by_tag(&repo.owner, &repo.repo, &spec.version)?
                };
                let asset = choose_asset(&release.assets, |asset| asset.name.as_str(), self.matcher.as_ref())?;
                if let Some(latest) = meta.update_latest_info(&spec.version, &release.tag_name) {
                    self.save(&meta)?;
                    return Ok(latest);
                }
                (release.tag_name.clone(), asset.browser_download_url.clone(), repo.repo)
            }
            None => {
                let url = spec
                    .url
                    .clone()
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| DownloadError::UrlRequired { name: name.clone() })?;
                if is_latest_tag(&spec.version) {
                    return Err(DownloadError::VersionRequired { name });
                }
                (spec.version.clone(), url, name.clone())
            }
        };

        self.fetch_and_unpack(&mut meta, &spec.version, &version, &url, &exe_name)
    }

    /// Removes the installed version `spec` names, then installs it afresh.
    ///
    /// The URL of the removed install is reused when `spec` has none.
    ///
    /// # Errors
    ///
    /// See [`Manager::install`].
    pub fn reinstall(&self, spec: &DownloadSpec) -> Result<Download> {
        let name = spec.artifact_name()?;
        let mut spec = spec.clone();
        if let Some(mut meta) = self.meta(&name)? {
            if let Some(previous) = meta.find_version(&spec.version, self.latest_release_cache, true).cloned() {
                self.remove_version(&mut meta, &previous)?;
                if spec.url.is_none() {
                    spec.url = Some(previous.url);
                }
            }
        }
        self.install(&spec)
    }

    /// Removes one version of `name`, or every version when `version` is
    /// `None`. Removing the last version removes the whole record.
    ///
    /// Removing something that is not installed is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when a directory cannot be deleted or the record
    /// cannot be rewritten.
    pub fn remove(&self, name: &str, version: Option<&str>) -> Result<()> {
        let Some(mut meta) = self.meta(name)? else {
            return Ok(());
        };
        match version {
            None => remove_all(&meta),
            Some(version) => {
                let found = meta.find_version(version, self.latest_release_cache, false).cloned();
                match found {
                    Some(download) => self.remove_version(&mut meta, &download),
                    None => Ok(()),
                }
            }
        }
    }

    /// Removes every version except the latest-or-last installed one, or
    /// everything when `all` is set. Restricted to `name` when given.
    ///
    /// Returns the removed installs.
    ///
    /// # Errors
    ///
    /// See [`Manager::remove`].
    pub fn clean(&self, name: Option<&str>, all: bool) -> Result<Vec<Download>> {
        let metas = match name {
            Some(name) => self.meta(name)?.into_iter().collect(),
            None => self.list(),
        };
        let mut removed = Vec::new();
        for mut meta in metas {
            if all {
                remove_all(&meta)?;
                removed.append(&mut meta.installed);
                continue;
            }
            let keep = meta.find_latest_or_last_installed().map(|d| d.version.clone());
            let doomed: Vec<Download> = meta
                .installed
                .iter()
                .filter(|d| keep.as_deref() != Some(d.version.as_str()))
                .cloned()
                .collect();
            for download in doomed {
                self.remove_version(&mut meta, &download)?;
                removed.push(download);
            }
        }
        Ok(removed)
    }

    fn fetch_and_unpack(
        &self,
        meta: &mut DownloadMeta,
        requested: &str,
        version: &str,
        url: &str,
        exe_name: &str,
    ) -> Result<Download> {
        let file_name = url_file_name(url);
        let format = ArchiveFormat::from_file_name(file_name).ok_or_else(|| DownloadError::UnknownArchiveFormat {
            file_name: file_name.to_owned(),
        })?;
        fs::create_dir_all(&meta.dir)?;

        let staged = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(file_name)
            .tempfile_in(&meta.dir)?;
        self.client.download(url, staged.path())?;

        let dir = meta.dir.join(sanitize_version(version));
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        let exe_name = if file_name.ends_with(".exe") {
            format!("{exe_name}.exe")
        } else {
            exe_name.to_owned()
        };
        log::info!("installing {file_name} into {}", dir.display());
        if let Err(err) = archive::unpack(format, staged.path(), &dir, &exe_name, &UnpackOptions::default()) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                log::warn!("could not remove {}: {cleanup}", dir.display());
            }
            return Err(err.into());
        }

        let download = Download {
            name: meta.name.clone(),
            version: version.to_owned(),
            url: url.to_owned(),
            dir,
            install_time: Utc::now(),
        };
        meta.remove_installed_version(version);
        meta.installed.push(download.clone());
        meta.update_latest_info(requested, version);
        self.save(meta)?;
        Ok(download)
    }

    fn remove_version(&self, meta: &mut DownloadMeta, download: &Download) -> Result<()> {
        log::info!("removing {}", download.dir.display());
        remove_dir_if_present(&download.dir)?;
        meta.remove_installed_version(&download.version);
        if meta.installed.is_empty() {
            return remove_all(meta);
        }
        self.save(meta)
    }

    fn save(&self, meta: &DownloadMeta) -> Result<()> {
        let path = meta_path(&self.root.join(&meta.name));
        let mut json = serde_json::to_vec_pretty(meta).map_err(|source| DownloadError::Metadata {
            path: path.clone(),
            source,
        })?;
        json.push(b'\n');
        iacscan_common::write_atomic(&path, &json)?;
        Ok(())
    }
}

fn read_meta(path: &Path) -> Result<Option<DownloadMeta>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| DownloadError::Metadata {
            path: path.to_path_buf(),
            source,
        })
}

fn remove_all(meta: &DownloadMeta) -> Result<()> {
    log::info!("removing {}", meta.dir.display());
    remove_dir_if_present(&meta.dir)
}

fn remove_dir_if_present(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}

/// The last path segment of `url`, without query or fragment.
fn url_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
