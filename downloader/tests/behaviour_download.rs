//! Behaviour tests for the download cache lifecycle.
//!
//! Releases are served by an in-process client so every scenario runs
//! without network access.

use flate2::Compression;
use flate2::write::GzEncoder;
use iacscan_downloader::github::{Release, ReleaseAsset, ReleaseClient};
use iacscan_downloader::platform::{Arch, Os, Platform};
use iacscan_downloader::release_matcher::DefaultMatcher;
use iacscan_downloader::{DownloadError, DownloadSpec, Manager};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct LocalReleases {
    latest: Rc<RefCell<HashMap<String, Release>>>,
    fetched: Rc<RefCell<Vec<String>>>,
}

impl ReleaseClient for LocalReleases {
    fn latest_release(&self, owner: &str, repo: &str) -> iacscan_downloader::Result<Release> {
        let url = format!("github.com/{owner}/{repo}");
        self.latest
            .borrow()
            .get(&url)
            .cloned()
            .ok_or(DownloadError::NotFound { url })
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> iacscan_downloader::Result<Release> {
        let release = self.latest_release(owner, repo)?;
        if release.tag_name == tag {
            Ok(release)
        } else {
            Err(DownloadError::NotFound {
                url: format!("github.com/{owner}/{repo}@{tag}"),
            })
        }
    }

    fn download(&self, url: &str, dest: &Path) -> iacscan_downloader::Result<()> {
        self.fetched.borrow_mut().push(url.to_owned());
        let body = if url.ends_with(".tar.gz") {
            scanner_tarball()
        } else {
            b"#!/bin/sh\n".to_vec()
        };
        std::fs::write(dest, body)?;
        Ok(())
    }
}

fn scanner_tarball() -> Vec<u8> {
    let body = b"#!/bin/sh\necho scanner\n";
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o755);
    builder
        .append_data(&mut header, "scanner", body.as_slice())
        .expect("append entry");
    let tar = builder.into_inner().expect("finish tar");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar).expect("compress");
    encoder.finish().expect("finish gzip")
}

struct DownloadWorld {
    root: TempDir,
    client: LocalReleases,
    last_error: Option<String>,
}

impl DownloadWorld {
    fn manager(&self) -> Manager<LocalReleases> {
        Manager::with_client(self.root.path(), self.client.clone()).with_matcher(DefaultMatcher::new(Platform {
            os: Os::Linux,
            arch: Arch::Amd64,
        }))
    }

    fn install(&mut self, spec: &DownloadSpec) {
        self.last_error = self.manager().install(spec).err().map(|err| err.to_string());
    }
}

#[fixture]
fn world() -> DownloadWorld {
    DownloadWorld {
        root: tempfile::tempdir().expect("temp dir"),
        client: LocalReleases::default(),
        last_error: None,
    }
}

#[given("a release \"{tag}\" of \"{repo}\" with assets \"{assets}\"")]
fn given_release(world: &mut DownloadWorld, tag: String, repo: String, assets: String) {
    let assets = assets
        .split(", ")
        .map(|name| ReleaseAsset {
            name: name.to_owned(),
            browser_download_url: format!("https://example.test/{tag}/{name}"),
        })
        .collect();
    world.client.latest.borrow_mut().insert(
        repo,
        Release {
            tag_name: tag,
            assets,
        },
    );
}

#[when("\"{repo}\" is installed")]
fn when_installed(world: &mut DownloadWorld, repo: String) {
    world.install(&DownloadSpec::github(&repo));
}

#[when("version \"{version}\" of \"{name}\" is installed from \"{url}\"")]
fn when_installed_from_url(world: &mut DownloadWorld, version: String, name: String, url: String) {
    let spec = DownloadSpec {
        name: Some(name),
        version,
        url: Some(url),
        latest_release_cache: None,
    };
    world.install(&spec);
    assert_eq!(world.last_error, None);
}

#[when("version \"{version}\" of \"{name}\" is removed")]
fn when_removed(world: &mut DownloadWorld, version: String, name: String) {
    world.manager().remove(&name, Some(&version)).expect("remove");
}

#[when("the cache is cleaned")]
fn when_cleaned(world: &mut DownloadWorld) {
    world.manager().clean(None, false).expect("clean");
}

#[then("{count:usize} download was made")]
fn then_download_count(world: &mut DownloadWorld, count: usize) {
    assert_eq!(world.client.fetched.borrow().len(), count);
}

#[then("{count:usize} downloads were made")]
fn then_downloads_count(world: &mut DownloadWorld, count: usize) {
    then_download_count(world, count);
}

#[then("\"{asset}\" was downloaded")]
fn then_asset_downloaded(world: &mut DownloadWorld, asset: String) {
    let fetched = world.client.fetched.borrow();
    assert!(fetched.iter().any(|url| url.ends_with(&format!("/{asset}"))), "fetched {fetched:?}");
}

#[then("version \"{version}\" of \"{name}\" is installed")]
fn then_installed(world: &mut DownloadWorld, version: String, name: String) {
    let download = world
        .manager()
        .installed(&name, Some(&version))
        .expect("installed");
    assert!(download.exe_path("scanner").is_file());
}

#[then("the latest version of \"{name}\" is recorded as \"{version}\"")]
fn then_latest_recorded(world: &mut DownloadWorld, name: String, version: String) {
    let meta = world.manager().meta(&name).expect("read meta").expect("meta exists");
    assert_eq!(meta.latest_version, version);
    assert!(meta.latest_check_time.is_some());
}

#[then("\"{name}\" is not installed")]
fn then_not_installed(world: &mut DownloadWorld, name: String) {
    assert!(world.manager().meta(&name).expect("read meta").is_none());
    assert!(!world.root.path().join(&name).exists());
}

#[then("only version \"{version}\" of \"{name}\" remains")]
fn then_only_version(world: &mut DownloadWorld, version: String, name: String) {
    let meta = world.manager().meta(&name).expect("read meta").expect("meta exists");
    let versions: Vec<_> = meta.installed.iter().map(|d| d.version.as_str()).collect();
    assert_eq!(versions, [version.as_str()]);
}

#[then("the install fails with \"{message}\"")]
fn then_install_fails(world: &mut DownloadWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}

#[scenario(
    path = "tests/features/download.feature",
    name = "Installing the latest release twice fetches it once"
)]
fn scenario_install_twice(world: DownloadWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/download.feature",
    name = "Removing the only version drops the record"
)]
fn scenario_remove_only_version(world: DownloadWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/download.feature",
    name = "Cleaning keeps the most recent install"
)]
fn scenario_clean(world: DownloadWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/download.feature",
    name = "Two archives at the top priority are ambiguous"
)]
fn scenario_ambiguous_assets(world: DownloadWorld) {
    let _ = world;
}
