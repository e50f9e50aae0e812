//! GitHub release lookup and asset download.
//!
//! The [`ReleaseClient`] trait keeps the network behind a seam so the
//! download manager can be exercised without HTTP.

use crate::error::{DownloadError, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

const API_ROOT: &str = "https://api.github.com";
const GITHUB_HOST: &str = "github.com";
/// Network timeout for release lookups and asset downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// A published release and its assets.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// The release tag, used as the installed version.
    pub tag_name: String,
    /// Files attached to the release.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One file attached to a release.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// File name, scored by the asset matcher.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

/// A repository named as `github.com/<owner>/<repo>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GithubRepo {
    /// Account or organisation.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl GithubRepo {
    /// Parses `github.com/<owner>/<repo>`, with or without an `https://`
    /// scheme.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_downloader::github::GithubRepo;
    ///
    /// let repo = GithubRepo::parse("github.com/aquasecurity/tfsec").expect("github repo");
    /// assert_eq!(repo.name(), "aquasecurity-tfsec");
    /// assert!(GithubRepo::parse("https://example.com/tool.tar.gz").is_none());
    /// ```
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let path = url.strip_prefix("https://").unwrap_or(url);
        let rest = path.strip_prefix(GITHUB_HOST)?.strip_prefix('/')?;
        let (owner, repo) = rest.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }

    /// The artifact name downloads of this repository are filed under.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", self.owner, self.repo)
    }
}

/// Returns `true` when `tag` asks for the newest release.
#[must_use]
pub fn is_latest_tag(tag: &str) -> bool {
    tag.is_empty() || tag == "latest"
}

/// Looks up releases and fetches their assets.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseClient {
    /// Fetches the newest published release.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the repository has no
    /// release.
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release>;

    /// Fetches the release carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotFound`] if the tag does not exist.
    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release>;

    /// Downloads `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the file write fails.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`ReleaseClient`] backed by the GitHub REST API over `ureq`.
#[derive(Clone, Debug, Default)]
pub struct HttpReleaseClient {
    token: Option<String>,
}

impl HttpReleaseClient {
    /// A client that authenticates with `GITHUB_TOKEN` when it is set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").ok().filter(|token| !token.is_empty()),
        }
    }

    /// The REST endpoint for the latest release, or the release tagged
    /// `tag`.
    #[must_use]
    pub fn release_url(owner: &str, repo: &str, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{API_ROOT}/repos/{owner}/{repo}/releases/tags/{tag}"),
            None => format!("{API_ROOT}/repos/{owner}/{repo}/releases/latest"),
        }
    }

    fn fetch_release(&self, url: &str) -> Result<Release> {
        let mut request = http_agent()
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.call().map_err(|e| map_ureq_error(url, &e))?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&body).map_err(|e| DownloadError::Http {
            url: url.to_owned(),
            reason: format!("invalid release payload: {e}"),
        })
    }
}

impl ReleaseClient for HttpReleaseClient {
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        let release = self.fetch_release(&Self::release_url(owner, repo, None))?;
        log::debug!("latest release of {owner}/{repo} is {}", release.tag_name);
        Ok(release)
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        self.fetch_release(&Self::release_url(owner, repo, Some(tag)))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("getting {url}");
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
