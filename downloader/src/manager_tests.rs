//! Unit tests for the download cache manager.

use super::*;
use crate::archive::test_archives::{gzip, tar_bytes};
use crate::github::{MockReleaseClient, Release, ReleaseAsset};
use crate::platform::{Arch, Os, Platform};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const REPO: &str = "github.com/acme/tool";

fn linux() -> DefaultMatcher {
    DefaultMatcher::new(Platform {
        os: Os::Linux,
        arch: Arch::Amd64,
    })
}

fn release(tag: &str) -> Release {
    Release {
        tag_name: tag.to_owned(),
        assets: vec![
            ReleaseAsset {
                name: format!("tool_{tag}_linux_amd64.tar.gz"),
                browser_download_url: format!("https://example.test/{tag}/tool_linux_amd64.tar.gz"),
            },
            ReleaseAsset {
                name: format!("tool_{tag}_darwin_amd64.tar.gz"),
                browser_download_url: format!("https://example.test/{tag}/tool_darwin_amd64.tar.gz"),
            },
        ],
    }
}

fn tarball() -> Vec<u8> {
    gzip(&tar_bytes(&[("tool", b"#!/bin/sh\n".as_slice(), 0o755)]))
}

fn expect_downloads(client: &mut MockReleaseClient, body: Vec<u8>, times: usize) {
    client
        .expect_download()
        .times(times)
        .returning(move |_, dest| {
            fs::write(dest, &body)?;
            Ok(())
        });
}

fn plain(name: &str, file: &str, version: &str) -> DownloadSpec {
    DownloadSpec {
        name: Some(name.to_owned()),
        version: version.to_owned(),
        url: Some(format!("https://example.test/{version}/{file}")),
        latest_release_cache: None,
    }
}

/// A manager whose downloads always yield a small shell script.
fn url_manager(root: &TempDir) -> Manager<MockReleaseClient> {
    let mut client = MockReleaseClient::new();
    client.expect_download().returning(|_, dest| {
        fs::write(dest, b"#!/bin/sh\n")?;
        Ok(())
    });
    Manager::with_client(root.path(), client)
}

#[fixture]
fn root() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[rstest]
fn installs_latest_release_once(root: TempDir) {
    let mut client = MockReleaseClient::new();
    client
        .expect_latest_release()
        .withf(|owner, repo| owner == "acme" && repo == "tool")
        .times(1)
        .returning(|_, _| Ok(release("v1.0.0")));
    expect_downloads(&mut client, tarball(), 1);
    let manager = Manager::with_client(root.path(), client).with_matcher(linux());

    let first = manager.install(&DownloadSpec::github(REPO)).expect("install");
    assert_eq!(first.name, "acme-tool");
    assert_eq!(first.version, "v1.0.0");
    assert_eq!(first.url, "https://example.test/v1.0.0/tool_linux_amd64.tar.gz");
    assert_eq!(first.dir, root.path().join("acme-tool/v1.0.0"));
    assert!(first.exe_path("tool").is_file());

    let second = manager.install(&DownloadSpec::github(REPO)).expect("cached install");
    assert_eq!(second, first);
    let pinned = manager
        .install(&DownloadSpec::github(REPO).with_version("v1.0.0"))
        .expect("pinned install");
    assert_eq!(pinned, first);

    let meta = manager.meta("acme-tool").expect("read meta").expect("meta exists");
    assert_eq!(meta.latest_version, "v1.0.0");
    assert_eq!(meta.installed.len(), 1);
}

#[rstest]
fn expired_latest_only_refreshes_the_check(root: TempDir) {
    let mut client = MockReleaseClient::new();
    client
        .expect_latest_release()
        .times(2)
        .returning(|_, _| Ok(release("v1.0.0")));
    expect_downloads(&mut client, tarball(), 1);
    let manager = Manager::with_client(root.path(), client)
        .with_matcher(linux())
        .with_latest_release_cache(TimeDelta::zero());

    let first = manager.install(&DownloadSpec::github(REPO)).expect("install");
    let checked = manager
        .meta("acme-tool")
        .expect("read meta")
        .and_then(|meta| meta.latest_check_time);
    let second = manager.install(&DownloadSpec::github(REPO)).expect("refresh");
    assert_eq!(second, first);
    let rechecked = manager
        .meta("acme-tool")
        .expect("read meta")
        .and_then(|meta| meta.latest_check_time);
    assert!(rechecked >= checked);
}

#[rstest]
fn tagged_releases_are_fetched_by_tag(root: TempDir) {
    let mut client = MockReleaseClient::new();
    client
        .expect_release_by_tag()
        .withf(|_, _, tag| tag == "v0.9.0")
        .times(1)
        .returning(|_, _, tag| Ok(release(tag)));
    expect_downloads(&mut client, tarball(), 1);
    let manager = Manager::with_client(root.path(), client).with_matcher(linux());

    let download = manager
        .install(&DownloadSpec::github(REPO).with_version("v0.9.0"))
        .expect("install");
    assert_eq!(download.version, "v0.9.0");
    let meta = manager.meta("acme-tool").expect("read meta").expect("meta exists");
    assert!(meta.latest_version.is_empty());
}

#[rstest]
fn ambiguous_assets_fail_before_downloading(root: TempDir) {
    let mut client = MockReleaseClient::new();
    client.expect_latest_release().returning(|_, _| {
        let mut release = release("v1");
        release.assets.push(ReleaseAsset {
            name: "tool-extra_linux_amd64.tar.gz".to_owned(),
            browser_download_url: "https://example.test/extra.tar.gz".to_owned(),
        });
        Ok(release)
    });
    let manager = Manager::with_client(root.path(), client).with_matcher(linux());

    let err = manager.install(&DownloadSpec::github(REPO)).expect_err("ambiguous");
    assert!(matches!(err, DownloadError::AmbiguousAsset { .. }));
}

#[rstest]
#[case::no_name(DownloadSpec { url: Some("https://example.test/opal".to_owned()), version: "1".to_owned(), ..DownloadSpec::default() })]
#[case::no_url(DownloadSpec { name: Some("opal".to_owned()), version: "1".to_owned(), ..DownloadSpec::default() })]
#[case::no_version(DownloadSpec { name: Some("opal".to_owned()), url: Some("https://example.test/opal".to_owned()), ..DownloadSpec::default() })]
fn incomplete_url_specs_are_rejected(root: TempDir, #[case] spec: DownloadSpec) {
    let manager = Manager::with_client(root.path(), MockReleaseClient::new());
    let err = manager.install(&spec).expect_err("incomplete spec");
    assert!(matches!(
        err,
        DownloadError::NameRequired | DownloadError::UrlRequired { .. } | DownloadError::VersionRequired { .. }
    ));
    assert!(manager.list().is_empty());
}

#[rstest]
fn plain_executables_are_copied(root: TempDir) {
    let manager = url_manager(&root);
    let download = manager.install(&plain("opal", "opal_linux_amd64", "0.1")).expect("install");
    let exe = download.dir.join("opal");
    assert_eq!(fs::read(&exe).expect("read exe"), b"#!/bin/sh\n");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&exe).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[rstest]
fn unknown_formats_are_rejected_without_downloading(root: TempDir) {
    let manager = Manager::with_client(root.path(), MockReleaseClient::new());
    let err = manager
        .install(&plain("tool", "tool_1.0_amd64.deb", "1.0"))
        .expect_err("unknown format");
    assert!(matches!(err, DownloadError::UnknownArchiveFormat { ref file_name } if file_name == "tool_1.0_amd64.deb"));
}

#[rstest]
fn failed_unpack_keeps_the_previous_record(root: TempDir) {
    let manager = url_manager(&root);
    manager.install(&plain("opal", "opal", "1")).expect("install v1");

    let mut client = MockReleaseClient::new();
    expect_downloads(&mut client, b"not a gzip stream".to_vec(), 1);
    let broken = Manager::with_client(root.path(), client);
    let err = broken
        .install(&plain("opal", "opal.tar.gz", "2"))
        .expect_err("bad archive");
    assert!(matches!(err, DownloadError::Unpack(_)));

    let meta = manager.meta("opal").expect("read meta").expect("meta exists");
    let versions: Vec<_> = meta.installed.iter().map(|d| d.version.as_str()).collect();
    assert_eq!(versions, ["1"]);
    assert!(!root.path().join("opal/2").exists());
}

#[rstest]
fn removing_versions(root: TempDir) {
    let manager = url_manager(&root);
    manager.install(&plain("opal", "opal", "1")).expect("install v1");
    manager.install(&plain("opal", "opal", "2")).expect("install v2");

    manager.remove("opal", Some("1")).expect("remove v1");
    assert!(!root.path().join("opal/1").exists());
    let meta = manager.meta("opal").expect("read meta").expect("meta exists");
    assert_eq!(meta.installed.len(), 1);

    manager.remove("opal", Some("missing")).expect("removing nothing");
    manager.remove("opal", Some("2")).expect("remove v2");
    assert!(!root.path().join("opal").exists());
    assert!(manager.meta("opal").expect("read meta").is_none());
}

#[rstest]
fn removing_everything(root: TempDir) {
    let manager = url_manager(&root);
    manager.install(&plain("opal", "opal", "1")).expect("install");
    manager.remove("opal", None).expect("remove all");
    assert!(!root.path().join("opal").exists());
    manager.remove("opal", None).expect("removing nothing");
}

#[rstest]
fn clean_keeps_the_last_install(root: TempDir) {
    let manager = url_manager(&root);
    for version in ["1", "2", "3"] {
        manager.install(&plain("opal", "opal", version)).expect("install");
    }
    manager.install(&plain("tfsec", "tfsec", "1")).expect("install");

    let removed = manager.clean(Some("opal"), false).expect("clean");
    let removed: Vec<_> = removed.iter().map(|d| d.version.as_str()).collect();
    assert_eq!(removed, ["1", "2"]);
    assert_eq!(manager.installed("opal", None).expect("kept").version, "3");

    let removed = manager.clean(None, true).expect("clean all");
    assert_eq!(removed.len(), 2);
    assert!(manager.list().is_empty());
}

#[rstest]
fn reinstall_reuses_the_recorded_url(root: TempDir) {
    let mut client = MockReleaseClient::new();
    client
        .expect_download()
        .withf(|url, _| url == "https://example.test/1/opal")
        .times(2)
        .returning(|_, dest| {
            fs::write(dest, b"#!/bin/sh\n")?;
            Ok(())
        });
    let manager = Manager::with_client(root.path(), client);
    let first = manager.install(&plain("opal", "opal", "1")).expect("install");

    let spec = DownloadSpec {
        name: Some("opal".to_owned()),
        version: "1".to_owned(),
        ..DownloadSpec::default()
    };
    let second = manager.reinstall(&spec).expect("reinstall");
    assert_eq!(second.url, first.url);
    assert!(second.install_time >= first.install_time);
}

#[rstest]
fn installed_reports_missing_artifacts(root: TempDir) {
    let manager = url_manager(&root);
    let err = manager.installed("opal", None).expect_err("nothing installed");
    assert_eq!(err.to_string(), "opal is not installed");
}

#[rstest]
fn list_skips_unreadable_records(root: TempDir) {
    let manager = url_manager(&root);
    manager.install(&plain("tfsec", "tfsec", "1")).expect("install");
    manager.install(&plain("opal", "opal", "1")).expect("install");
    fs::create_dir_all(root.path().join("broken")).expect("create dir");
    fs::write(root.path().join("broken/meta.json"), b"{").expect("write meta");

    let names: Vec<_> = manager.list().into_iter().map(|meta| meta.name).collect();
    assert_eq!(names, ["opal", "tfsec"]);
    assert!(matches!(manager.meta("broken"), Err(DownloadError::Metadata { .. })));
}

#[rstest]
#[case::plain("https://example.test/v1/tool.tar.gz", "tool.tar.gz")]
#[case::query("https://example.test/tool.zip?token=abc", "tool.zip")]
#[case::trailing_slash("https://example.test/tool/", "tool")]
fn file_names_from_urls(#[case] url: &str, #[case] expected: &str) {
    assert_eq!(url_file_name(url), expected);
}
