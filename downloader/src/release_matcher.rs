//! Release asset selection.
//!
//! A matcher scores every asset name; the single asset with the highest
//! non-zero priority wins. A tie at the top is an error naming the tied
//! assets, and no match at all is an error naming every asset.

use crate::error::{DownloadError, Result};
use crate::platform::Platform;

/// How strongly an asset name is preferred. Zero means "no match".
pub type Priority = u32;

/// The priority that rejects an asset.
pub const NO_MATCH: Priority = 0;

const AVOID_SUBSTRINGS: &[&str] = &["-checkgen-"];

/// Scores release asset names.
pub trait AssetMatcher {
    /// Returns the priority of `asset`, or [`NO_MATCH`].
    fn priority(&self, asset: &str) -> Priority;
}

impl<F> AssetMatcher for F
where
    F: Fn(&str) -> Priority,
{
    fn priority(&self, asset: &str) -> Priority {
        self(asset)
    }
}

/// Matches assets built for a platform and prefers archives over bare
/// executables.
#[derive(Clone, Copy, Debug)]
pub struct DefaultMatcher {
    platform: Platform,
}

impl DefaultMatcher {
    /// A matcher for the given platform.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for DefaultMatcher {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl AssetMatcher for DefaultMatcher {
    fn priority(&self, asset: &str) -> Priority {
        let lower = asset.to_lowercase();
        if !self.platform.matches(&lower) || AVOID_SUBSTRINGS.iter().any(|s| lower.contains(s)) {
            return NO_MATCH;
        }
        format_priority(&lower)
    }
}

/// Scores an asset by its packaging alone.
///
/// # Examples
///
/// ```
/// use iacscan_downloader::release_matcher::{NO_MATCH, format_priority};
///
/// assert_eq!(format_priority("tool.tar.gz"), 100);
/// assert_eq!(format_priority("tool.zip"), 99);
/// assert_eq!(format_priority("tool.deb"), NO_MATCH);
/// assert_eq!(format_priority("tool"), 1);
/// ```
#[must_use]
pub fn format_priority(asset: &str) -> Priority {
    let lower = asset.to_lowercase();
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| lower.ends_with(s));
    if ends_with_any(&[".tar.gz", ".tgz"]) {
        100
    } else if lower.ends_with(".zip") {
        99
    } else if ends_with_any(&[".deb", ".rpm", ".apk", ".sig"]) {
        NO_MATCH
    } else {
        1
    }
}

/// Picks the single best asset from `assets`.
///
/// # Errors
///
/// Returns [`DownloadError::AmbiguousAsset`] when several assets share the
/// top priority and [`DownloadError::NoMatchingAsset`] when none match.
pub fn choose_asset<'a, T, M>(assets: &'a [T], name_of: impl Fn(&T) -> &str, matcher: &M) -> Result<&'a T>
where
    M: AssetMatcher + ?Sized,
{
    let mut best: Vec<&T> = Vec::new();
    let mut top = NO_MATCH;
    for asset in assets {
        let priority = matcher.priority(name_of(asset));
        if priority == NO_MATCH || priority < top {
            continue;
        }
        if priority > top {
            top = priority;
            best.clear();
        }
        best.push(asset);
    }

    match best.as_slice() {
        [only] => Ok(*only),
        [] => Err(DownloadError::NoMatchingAsset {
            assets: join_names(assets.iter(), &name_of),
        }),
        tied => Err(DownloadError::AmbiguousAsset {
            candidates: join_names(tied.iter().copied(), &name_of),
        }),
    }
}

fn join_names<'a, T: 'a>(assets: impl Iterator<Item = &'a T>, name_of: &impl Fn(&T) -> &str) -> String {
    assets.map(name_of).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use rstest::{fixture, rstest};

    #[fixture]
    fn linux_amd64() -> DefaultMatcher {
        DefaultMatcher::new(Platform {
            os: Os::Linux,
            arch: Arch::Amd64,
        })
    }

    fn choose<'a>(assets: &'a [&'a str], matcher: &DefaultMatcher) -> Result<&'a &'a str> {
        choose_asset(assets, |name| *name, matcher)
    }

    #[rstest]
    fn prefers_linux_tarball(linux_amd64: DefaultMatcher) {
        let assets = [
            "tool_1.2.3_Linux-64bit.tar.gz",
            "tool_1.2.3_Linux-64bit.zip",
            "tool_1.2.3_Linux-64bit.deb",
            "tool_1.2.3_Darwin-64bit.tar.gz",
        ];
        let chosen = choose(&assets, &linux_amd64).expect("asset chosen");
        assert_eq!(*chosen, "tool_1.2.3_Linux-64bit.tar.gz");
    }

    #[rstest]
    fn tarball_beats_zip_in_either_order(linux_amd64: DefaultMatcher) {
        let assets = ["tool_linux_amd64.zip", "tool_linux_amd64.tar.gz"];
        let chosen = choose(&assets, &linux_amd64).expect("asset chosen");
        assert_eq!(*chosen, "tool_linux_amd64.tar.gz");
    }

    #[rstest]
    fn two_tarballs_are_ambiguous(linux_amd64: DefaultMatcher) {
        let assets = ["a_linux_amd64.tar.gz", "b_linux_amd64.tar.gz", "c_linux_amd64.zip"];
        let err = choose(&assets, &linux_amd64).expect_err("tie rejected");
        match err {
            DownloadError::AmbiguousAsset { candidates } => {
                assert_eq!(candidates, "a_linux_amd64.tar.gz b_linux_amd64.tar.gz");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn tie_below_the_top_is_not_ambiguous(linux_amd64: DefaultMatcher) {
        let assets = ["a_linux_amd64", "b_linux_amd64", "c_linux_amd64.zip"];
        let chosen = choose(&assets, &linux_amd64).expect("asset chosen");
        assert_eq!(*chosen, "c_linux_amd64.zip");
    }

    #[rstest]
    fn no_match_lists_every_asset(linux_amd64: DefaultMatcher) {
        let assets = ["tool_windows_amd64.zip", "tool_linux_amd64.deb"];
        let err = choose(&assets, &linux_amd64).expect_err("nothing matches");
        assert_eq!(
            err.to_string(),
            "could not find a matching release asset from: tool_windows_amd64.zip tool_linux_amd64.deb"
        );
    }

    #[rstest]
    fn avoided_builds_are_rejected(linux_amd64: DefaultMatcher) {
        assert_eq!(linux_amd64.priority("tool-checkgen-_linux_amd64.tar.gz"), NO_MATCH);
    }

    #[rstest]
    fn closures_are_matchers() {
        let assets = ["policies.zip", "README.md"];
        let matcher = |name: &str| Priority::from(name.ends_with(".zip"));
        let chosen = choose_asset(&assets, |name| *name, &matcher).expect("asset chosen");
        assert_eq!(*chosen, "policies.zip");
    }
}
