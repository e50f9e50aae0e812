//! CI and git context captured alongside an assessment.
//!
//! Environment variables from known CI systems are kept, minus anything
//! that looks like a credential. Git branch, commit, and remote plus the
//! host name are added under `IACSCAN_METADATA_*` keys.

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output};

/// Context key naming the detected CI system.
pub const CI_SYSTEM_KEY: &str = "IACSCAN_METADATA_CI_SYSTEM";
/// Context key for the checked-out branch.
pub const GIT_BRANCH_KEY: &str = "IACSCAN_METADATA_GIT_BRANCH";
/// Context key for the checked-out commit.
pub const GIT_COMMIT_KEY: &str = "IACSCAN_METADATA_GIT_COMMIT";
/// Context key for the normalised remote URL.
pub const GIT_REMOTE_KEY: &str = "IACSCAN_METADATA_GIT_REMOTE";
/// Context key for the host name.
pub const HOSTNAME_KEY: &str = "IACSCAN_METADATA_HOSTNAME";

/// Prefixes of variables set by a specific CI vendor.
const CI_VENDOR_PREFIXES: &[&str] = &[
    "GITHUB_",
    "CIRCLE_",
    "GITLAB_",
    "BUILDKITE_",
    "BITBUCKET_",
    "JENKINS_",
];

/// Generic CI prefix; kept but never names the CI system.
const CI_GENERIC_PREFIX: &str = "CI_";

const OMIT_SUBSTRINGS: &[&str] = &[
    "SECRET",
    "KEY",
    "PRIVATE",
    "PASSWORD",
    "PASSPHRASE",
    "CREDS",
    "TOKEN",
    "AUTH",
    "ENC",
    "JWT",
    "CLIENT",
    "TENANT",
    "USERNAME",
    "_USR",
    "_PSW",
];

const OMIT_EXACT: &[&str] = &[
    "BUILDKITE_S3_SECRET_ACCESS_KEY",
    "BUILDKITE_S3_ACCESS_KEY_ID",
    "BUILDKITE_S3_ACCESS_URL",
    "BUILDKITE_COMMAND",
    "BUILDKITE_SCRIPT_PATH",
    // CircleCI's decryption key
    "KEY",
    "CI_DEPLOY_PASSWORD",
    "CI_DEPLOY_USER",
    "CI_JOB_TOKEN",
    "CI_JOB_JWT",
    "CI_REGISTRY_USER",
    "CI_REGISTRY_PASSWORD",
    "BITBUCKET_STEP_OIDC_TOKEN",
];

const GIT_METADATA: &[(&str, &[&str])] = &[
    (GIT_BRANCH_KEY, &["rev-parse", "--abbrev-ref", "HEAD"]),
    (GIT_COMMIT_KEY, &["rev-parse", "HEAD"]),
    (GIT_REMOTE_KEY, &["ls-remote", "--get-url"]),
];

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        Ok(Command::new(cmd).args(args).output()?)
    }
}

/// Returns `true` when the upper-cased variable `name` must never leave the
/// machine.
///
/// # Examples
///
/// ```
/// use iacscan::ci_env::is_sensitive;
///
/// assert!(is_sensitive("GITHUB_TOKEN"));
/// assert!(is_sensitive("CI_DEPLOY_USER"));
/// assert!(!is_sensitive("GITHUB_SHA"));
/// ```
#[must_use]
pub fn is_sensitive(name: &str) -> bool {
    OMIT_SUBSTRINGS.iter().any(|s| name.contains(s)) || OMIT_EXACT.contains(&name)
}

/// Keeps the CI variables from `vars` that are safe to report and names
/// the CI system they came from.
///
/// Names are upper-cased. The CI system is the vendor prefix of the first
/// vendor variable in name order; it is empty when no vendor variable
/// survives filtering.
pub fn ci_values<I, K, V>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut values = BTreeMap::new();
    for (name, value) in vars {
        let name = name.as_ref().to_uppercase();
        if is_sensitive(&name) {
            log::trace!("omitting {name} from the CI context");
            continue;
        }
        let vendor = CI_VENDOR_PREFIXES.iter().any(|p| name.starts_with(p));
        if vendor || name.starts_with(CI_GENERIC_PREFIX) {
            values.insert(name, value.into());
        }
    }
    let system = values
        .keys()
        .find(|name| CI_VENDOR_PREFIXES.iter().any(|p| name.starts_with(p)))
        .and_then(|name| name.split_once('_'))
        .map(|(prefix, _)| prefix.to_owned())
        .unwrap_or_default();
    values.insert(CI_SYSTEM_KEY.to_owned(), system);
    values
}

/// Adds branch, commit, and remote of the repository at `dir`.
///
/// Commands that fail or cannot be spawned are skipped.
pub fn add_git_metadata(values: &mut BTreeMap<String, String>, dir: &Path, executor: &dyn CommandExecutor) {
    let dir = dir.to_string_lossy();
    for (key, git_args) in GIT_METADATA {
        let mut args = vec!["-C", dir.as_ref()];
        args.extend_from_slice(git_args);
        if let Some(out) = successful_stdout(executor, "git", &args) {
            values.insert((*key).to_owned(), out);
        }
    }
    if let Some(remote) = values.get_mut(GIT_REMOTE_KEY) {
        *remote = normalize_git_remote(remote);
    }
}

/// Resolves the host name from `HOSTNAME`/`COMPUTERNAME`, falling back to
/// the `hostname` command.
pub fn hostname<F>(lookup: F, executor: &dyn CommandExecutor) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|value| !value.is_empty()))
        .or_else(|| successful_stdout(executor, "hostname", &[]))
}

/// Captures the full context for `dir` from the process environment.
pub fn capture(dir: &Path, executor: &dyn CommandExecutor) -> BTreeMap<String, String> {
    let mut values = ci_values(std::env::vars());
    add_git_metadata(&mut values, dir, executor);
    if let Some(host) = hostname(|name| std::env::var(name).ok(), executor) {
        values.insert(HOSTNAME_KEY.to_owned(), host);
    }
    values
}

/// Rewrites an SSH remote such as `git@github.com:fizz/buzz.git` as
/// `github.com/fizz/buzz`; other remotes are returned unchanged.
///
/// # Examples
///
/// ```
/// use iacscan::ci_env::normalize_git_remote;
///
/// assert_eq!(normalize_git_remote("git@github.com:fizz/buzz.git"), "github.com/fizz/buzz");
/// assert_eq!(normalize_git_remote("https://github.com/fizz/buzz"), "https://github.com/fizz/buzz");
/// ```
#[must_use]
pub fn normalize_git_remote(remote: &str) -> String {
    let at = remote.find('@');
    let dot_git = remote.rfind(".git");
    match (at, dot_git) {
        (Some(at), Some(end)) if at > 0 && end > at => remote
            .get(at + 1..end)
            .map_or_else(|| remote.to_owned(), |host_path| host_path.replacen(':', "/", 1)),
        _ => remote.to_owned(),
    }
}

fn successful_stdout(executor: &dyn CommandExecutor, cmd: &str, args: &[&str]) -> Option<String> {
    match executor.run(cmd, args) {
        Ok(output) if output.status.success() => {
            let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            (!text.is_empty()).then_some(text)
        }
        Ok(output) => {
            log::debug!("{cmd} {} exited with {}", args.join(" "), output.status);
            None
        }
        Err(err) => {
            log::debug!("could not run {cmd}: {err}");
            None
        }
    }
}
