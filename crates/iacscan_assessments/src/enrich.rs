//! Attaching partial fingerprints and repository paths to findings.

use crate::finding::Finding;
use iacscan_common::{find_repo_root, relative_slash_path};
use iacscan_fingerprint::partial;
use std::collections::{BTreeMap, HashMap};
use std::io::BufReader;
use std::path::Path;

/// Fills in `partial_fingerprint` and `repo_path` for findings whose files
/// live under `dir`.
///
/// Each referenced file is streamed through the fingerprinter once. A
/// finding whose line lies beyond the last fingerprinted line keeps an
/// empty fingerprint. Files that cannot be read are logged and skipped.
/// `repo_path` is set only when `dir` is inside a git repository and the
/// finding is not for a generated file.
pub fn compute_partial_fingerprints(findings: &mut [Finding], dir: &Path) {
    let rel_dir = repo_relative_dir(dir);
    let mut by_file: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (index, finding) in findings.iter_mut().enumerate() {
        let Some(file_path) = finding.file_path.clone() else {
            continue;
        };
        if let Some(rel_dir) = rel_dir.as_deref()
            && !finding.generated_file
        {
            finding.repo_path = Some(join_slash(rel_dir, &file_path));
        }
        if finding.line.is_some_and(|line| line > 0) {
            by_file.entry(file_path).or_default().push(index);
        }
    }

    for (file_path, indices) in by_file {
        let mut by_line: HashMap<usize, Vec<usize>> = HashMap::new();
        for index in indices {
            if let Some(line) = findings.get(index).and_then(|finding| finding.line) {
                by_line.entry(line).or_default().push(index);
            }
        }
        fingerprint_file(findings, &dir.join(&file_path), &by_line);
    }
}

fn fingerprint_file(findings: &mut [Finding], path: &Path, by_line: &HashMap<usize, Vec<usize>>) {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) => {
            log::warn!("could not read {} for fingerprinting: {err}", path.display());
            return;
        }
    };
    let result = partial(BufReader::new(file), |line, fingerprint| {
        for index in by_line.get(&line).into_iter().flatten() {
            if let Some(finding) = findings.get_mut(*index) {
                finding.partial_fingerprint = Some(fingerprint.clone());
            }
        }
    });
    if let Err(err) = result {
        log::warn!(
            "could not compute partial fingerprints for {}: {err}",
            path.display()
        );
    }
}

fn repo_relative_dir(dir: &Path) -> Option<String> {
    let root = match find_repo_root(dir) {
        Ok(root) => root?,
        Err(err) => {
            log::debug!("could not locate repository for {}: {err}", dir.display());
            return None;
        }
    };
    let absolute = std::path::absolute(dir).ok()?;
    relative_slash_path(&root, &absolute)
}

fn join_slash(dir: &str, file_path: &str) -> String {
    if dir == "." {
        file_path.to_owned()
    } else {
        format!("{dir}/{file_path}")
    }
}
