//! Configuration loaded from `.iacscan.toml`.
//!
//! Every field is optional. The file named by `--config` must exist; the
//! default `.iacscan.toml` in the working directory is used only when
//! present. `IACSCAN_DOWNLOAD_DIR` overrides the configured download
//! directory.

use crate::error::{CliError, Result};
use directories_next::ProjectDirs;
use iacscan_downloader::meta::DEFAULT_LATEST_CACHE_HOURS;
use iacscan_inventory::DEFAULT_BUFFER_SIZE;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".iacscan.toml";

/// Environment variable that overrides [`Config::download_dir`].
pub const DOWNLOAD_DIR_ENV: &str = "IACSCAN_DOWNLOAD_DIR";

/// Settings shared by every command.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the download cache.
    pub download_dir: Option<PathBuf>,
    /// Bytes of each file the inventory walker peeks at.
    pub peek_buffer_size: usize,
    /// How long a resolved "latest" release is trusted.
    pub latest_release_cache_hours: u64,
    /// Default failure thresholds, in `--fail` syntax.
    pub fail: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: None,
            peek_buffer_size: DEFAULT_BUFFER_SIZE,
            latest_release_cache_hours: DEFAULT_LATEST_CACHE_HOURS.unsigned_abs(),
            fail: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `explicit`, or `.iacscan.toml` from the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file cannot be parsed, or if an
    /// explicitly named file cannot be read.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::load_with(path, explicit.is_some(), |p: &Path| std::fs::read_to_string(p))
    }

    /// Loads configuration from `path` using the supplied reader.
    ///
    /// A missing file yields the defaults unless `required` is set. The
    /// reader is injectable so tests can supply file contents without
    /// touching the file system.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] for unreadable or malformed files.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan::config::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::load_with(Path::new(".iacscan.toml"), false, |_| {
    ///     Ok("fail = [\"high\"]".to_owned())
    /// })?;
    /// assert_eq!(config.fail, ["high"]);
    /// assert_eq!(config.peek_buffer_size, 4096);
    /// # Ok::<(), iacscan::error::CliError>(())
    /// ```
    pub fn load_with<F>(path: &Path, required: bool, read: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> io::Result<String>,
    {
        let text = match read(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                log::trace!("no configuration at {}", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(CliError::Config {
                    path: path.to_owned(),
                    reason: err.to_string(),
                });
            }
        };
        let config: Self = toml::from_str(&text).map_err(|err| CliError::Config {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// The download cache root.
    ///
    /// `IACSCAN_DOWNLOAD_DIR` wins over the configured directory, which
    /// wins over `<user cache dir>/downloads`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NoDownloadDir`] when no directory is configured
    /// and the platform has no cache directory.
    pub fn download_root(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DOWNLOAD_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("", "", "iacscan")
            .map(|dirs| dirs.cache_dir().join("downloads"))
            .ok_or(CliError::NoDownloadDir)
    }

    /// [`Config::latest_release_cache_hours`] as a duration.
    #[must_use]
    pub fn latest_release_cache(&self) -> chrono::TimeDelta {
        let hours = i64::try_from(self.latest_release_cache_hours).unwrap_or(i64::MAX);
        chrono::TimeDelta::try_hours(hours).unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(text: &str) -> Result<Config> {
        let text = text.to_owned();
        Config::load_with(Path::new("test.toml"), true, move |_| Ok(text))
    }

    #[rstest]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.latest_release_cache_hours, 24);
        assert_eq!(config.peek_buffer_size, 4096);
    }

    #[rstest]
    fn every_field_is_read() {
        let config = parse(
            r#"
            download_dir = "/var/cache/iacscan"
            peek_buffer_size = 8192
            latest_release_cache_hours = 1
            fail = ["medium=5", "critical"]
            "#,
        )
        .expect("full config");
        assert_eq!(config.download_dir, Some(PathBuf::from("/var/cache/iacscan")));
        assert_eq!(config.peek_buffer_size, 8192);
        assert_eq!(config.latest_release_cache(), chrono::TimeDelta::hours(1));
        assert_eq!(config.fail, ["medium=5", "critical"]);
    }

    #[rstest]
    fn unknown_fields_are_rejected() {
        let err = parse("download_directory = \"/tmp\"").expect_err("unknown field");
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[rstest]
    #[case::optional(false, true)]
    #[case::required(true, false)]
    fn missing_files(#[case] required: bool, #[case] ok: bool) {
        let result = Config::load_with(Path::new("absent.toml"), required, |_| {
            Err(io::Error::from(io::ErrorKind::NotFound))
        });
        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    fn environment_overrides_the_download_dir() {
        let config = Config {
            download_dir: Some(PathBuf::from("/configured")),
            ..Config::default()
        };
        temp_env::with_var(DOWNLOAD_DIR_ENV, Some("/from-env"), || {
            assert_eq!(config.download_root().expect("root"), PathBuf::from("/from-env"));
        });
        temp_env::with_var_unset(DOWNLOAD_DIR_ENV, || {
            assert_eq!(config.download_root().expect("root"), PathBuf::from("/configured"));
        });
    }

    #[rstest]
    fn default_download_dir_lives_in_the_cache() {
        temp_env::with_var_unset(DOWNLOAD_DIR_ENV, || {
            if let Ok(root) = Config::default().download_root() {
                assert!(root.ends_with("downloads"));
            }
        });
    }
}
