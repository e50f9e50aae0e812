//! CLI argument definitions for iacscan.
//!
//! This module defines the command-line interface using clap. It is kept
//! apart from the entrypoint so the binary stays focused on orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Inventory, fingerprint, and assess infrastructure-as-code repositories.
#[derive(Parser, Debug)]
#[command(name = "iacscan")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Classify the current directory:\n",
    "    $ iacscan inventory\n\n",
    "  Fail when five medium-or-worse findings are reported:\n",
    "    $ iacscan assess --findings results.json --fail medium=5\n\n",
    "  Install the latest tfsec release:\n",
    "    $ iacscan download install --url github.com/aquasecurity/tfsec",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file [default: .iacscan.toml when present].
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the inventory manifest of one or more directories as JSON.
    Inventory(InventoryArgs),

    /// Print or compare partial fingerprints.
    #[command(subcommand)]
    Fingerprint(FingerprintCommand),

    /// Fingerprint findings and evaluate failure thresholds.
    Assess(AssessArgs),

    /// Manage downloaded tools.
    #[command(subcommand)]
    Download(DownloadCommand),

    /// Print the CI and git context of a directory as JSON.
    Context(DirArgs),
}

/// Directories to inventory.
#[derive(Parser, Debug, Clone)]
pub struct InventoryArgs {
    /// Directories to walk. With more than one, the output maps each
    /// directory to its manifest.
    #[arg(default_value = ".", num_args = 1..)]
    pub dirs: Vec<Utf8PathBuf>,
}

/// A directory to operate on.
#[derive(Parser, Debug, Clone)]
pub struct DirArgs {
    /// Directory to inspect.
    #[arg(default_value = ".")]
    pub dir: Utf8PathBuf,
}

/// Fingerprint subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum FingerprintCommand {
    /// Print `<fingerprint> <line>` for every line of each file.
    Show {
        /// Files to fingerprint; stdin when omitted.
        files: Vec<Utf8PathBuf>,
    },

    /// Print the lines two files share, by fingerprint.
    Diff {
        /// First file.
        left: Utf8PathBuf,
        /// Second file.
        right: Utf8PathBuf,
    },
}

/// Arguments for the assess command.
#[derive(Parser, Debug, Clone)]
pub struct AssessArgs {
    /// JSON file holding an assessment or an array of findings.
    #[arg(long, value_name = "FILE")]
    pub findings: Utf8PathBuf,

    /// Directory finding paths are relative to [default: the findings file's directory].
    #[arg(long, value_name = "DIR")]
    pub dir: Option<Utf8PathBuf>,

    /// Fail at `severity=count` findings or more (repeatable; `severity` alone means 1).
    #[arg(long, value_name = "SEVERITY[=COUNT]")]
    pub fail: Vec<String>,

    /// Omit passed findings from the output.
    #[arg(long)]
    pub drop_passed: bool,
}

/// Download subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DownloadCommand {
    /// List downloaded tools.
    List {
        /// Output in JSON format for scripting.
        #[arg(long)]
        json: bool,
    },

    /// Install a tool.
    Install(InstallArgs),

    /// Print the record of a downloaded tool as JSON.
    Get {
        /// The name of the tool.
        #[arg(long)]
        name: String,
    },

    /// Print the install directory of a downloaded tool.
    PrintDir(VersionArgs),

    /// Remove a downloaded tool, or one version of it.
    Remove(VersionArgs),

    /// Remove all but the latest version of every download.
    Clean {
        /// Remove every version, including the latest.
        #[arg(long)]
        all: bool,

        /// Only clean this tool.
        #[arg(long)]
        name: Option<String>,
    },
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    /// The name to file the tool under; derived for GitHub repositories.
    #[arg(long)]
    pub name: Option<String>,

    /// The version to install; defaults to the latest GitHub release.
    #[arg(long, default_value = "")]
    pub version: String,

    /// `github.com/<owner>/<repo>` or a direct download URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Remove the matching install first.
    #[arg(long)]
    pub reinstall: bool,
}

/// A tool name and an optional version.
#[derive(Parser, Debug, Clone)]
pub struct VersionArgs {
    /// The name of the tool.
    #[arg(long)]
    pub name: String,

    /// The version; the latest when omitted.
    #[arg(long)]
    pub version: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
