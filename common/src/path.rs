//! Helpers for forward-slash relative paths.
//!
//! Inventory values and finding locations are stored relative to a root and
//! always use `/` as the separator, regardless of the host platform.

use camino::Utf8Path;
use std::path::{Component, Path};

/// Converts `path` to a string using `/` between components.
///
/// # Examples
///
/// ```
/// use iacscan_common::to_slash;
/// use std::path::Path;
///
/// assert_eq!(to_slash(Path::new("a/b/c.tf")), "a/b/c.tf");
/// ```
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::CurDir => ".".into(),
            Component::ParentDir => "..".into(),
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy(),
            Component::Normal(name) => name.to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    if out.is_empty() { ".".to_owned() } else { out }
}

/// Returns `path` relative to `root` in slash form, or `None` when `path`
/// does not live under `root`. The root itself maps to `"."`.
///
/// # Examples
///
/// ```
/// use iacscan_common::relative_slash_path;
/// use std::path::Path;
///
/// let rel = relative_slash_path(Path::new("/repo"), Path::new("/repo/mod/main.tf"));
/// assert_eq!(rel.as_deref(), Some("mod/main.tf"));
/// ```
#[must_use]
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(to_slash)
}

/// Returns the slash-form parent directory of a relative slash path.
///
/// Entries at the top level have the parent `"."`.
///
/// # Examples
///
/// ```
/// use iacscan_common::parent_dir;
///
/// assert_eq!(parent_dir("mod-a/main.tf"), "mod-a");
/// assert_eq!(parent_dir("main.tf"), ".");
/// ```
#[must_use]
pub fn parent_dir(rel: &str) -> String {
    match Utf8Path::new(rel).parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.as_str().to_owned(),
        _ => ".".to_owned(),
    }
}

/// Returns `true` when `path` equals `dir` or lies beneath it. The directory
/// `"."` contains everything.
#[must_use]
pub fn is_within(dir: &str, path: &str) -> bool {
    if dir == "." || dir == path {
        return true;
    }
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/'))
}
