//! `iacscan inventory`: classify directories.

use super::write_json;
use crate::cli::InventoryArgs;
use crate::config::Config;
use crate::error::Result;
use iacscan_inventory::{InventoryCache, Manifest};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

/// Walks every directory in `args.dirs` with every detector and prints the
/// manifests.
///
/// A single directory prints its manifest. Several print an object keyed by
/// directory; a directory named twice is walked once.
///
/// # Errors
///
/// Returns an error only if the output cannot be written; unreadable
/// entries are logged and skipped by the walker.
pub fn run(args: &InventoryArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let cache = InventoryCache::default().with_buffer_size(config.peek_buffer_size);
    let manifests: Vec<(&str, Arc<Manifest>)> = args
        .dirs
        .iter()
        .map(|dir| {
            let manifest = cache.scan(dir.as_std_path());
            log::info!("inventoried {dir}");
            (dir.as_str(), manifest)
        })
        .collect();

    match manifests.as_slice() {
        [(_, manifest)] => write_json(out, manifest.as_ref()),
        _ => {
            let by_dir: BTreeMap<&str, &Manifest> = manifests
                .iter()
                .map(|(dir, manifest)| (*dir, manifest.as_ref()))
                .collect();
            write_json(out, &by_dir)
        }
    }
}
