//! `iacscan download`: manage the download cache.

use super::write_json;
use crate::cli::{DownloadCommand, InstallArgs, VersionArgs};
use crate::error::Result;
use iacscan_downloader::github::ReleaseClient;
use iacscan_downloader::{DownloadError, DownloadSpec, Manager};
use std::io::Write;

/// Runs a download subcommand against `manager`.
///
/// # Errors
///
/// Returns any error raised by the download manager, or a write failure.
pub fn run<C: ReleaseClient>(command: &DownloadCommand, manager: &Manager<C>, out: &mut dyn Write) -> Result<()> {
    match command {
        DownloadCommand::List { json } => list(manager, *json, out),
        DownloadCommand::Install(args) => install(args, manager, out),
        DownloadCommand::Get { name } => {
            let meta = manager
                .meta(name)?
                .ok_or_else(|| DownloadError::NotInstalled { name: name.clone() })?;
            write_json(out, &meta)
        }
        DownloadCommand::PrintDir(VersionArgs { name, version }) => {
            let download = manager.installed(name, version.as_deref())?;
            writeln!(out, "{}", download.dir.display())?;
            Ok(())
        }
        DownloadCommand::Remove(VersionArgs { name, version }) => {
            manager.remove(name, version.as_deref())?;
            log::info!("removed {name} {}", version.as_deref().unwrap_or("(all versions)"));
            Ok(())
        }
        DownloadCommand::Clean { all, name } => {
            for removed in manager.clean(name.as_deref(), *all)? {
                writeln!(out, "removed {} {}", removed.name, removed.version)?;
            }
            Ok(())
        }
    }
}

fn list<C: ReleaseClient>(manager: &Manager<C>, json: bool, out: &mut dyn Write) -> Result<()> {
    let metas = manager.list();
    if json {
        return write_json(out, &metas);
    }
    for meta in &metas {
        for download in &meta.installed {
            let latest = if download.version == meta.latest_version { " (latest)" } else { "" };
            writeln!(
                out,
                "{} {}{latest} {} {}",
                download.name,
                download.version,
                download.install_time.to_rfc3339(),
                download.dir.display()
            )?;
        }
    }
    Ok(())
}

fn install<C: ReleaseClient>(args: &InstallArgs, manager: &Manager<C>, out: &mut dyn Write) -> Result<()> {
    let spec = DownloadSpec {
        name: args.name.clone(),
        version: args.version.clone(),
        url: args.url.clone(),
        latest_release_cache: None,
    };
    let download = if args.reinstall {
        manager.reinstall(&spec)?
    } else {
        manager.install(&spec)?
    };
    log::info!("installed {} {}", download.name, download.version);
    writeln!(out, "{}", download.dir.display())?;
    Ok(())
}
