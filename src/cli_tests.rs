//! Tests for CLI parsing.

use super::*;
use rstest::rstest;

#[test]
fn inventory_defaults_to_the_current_directory() {
    let cli = Cli::parse_from(["iacscan", "inventory"]);
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
    assert!(cli.config.is_none());
    match cli.command {
        Command::Inventory(args) => assert_eq!(args.dirs, [Utf8PathBuf::from(".")]),
        other => panic!("expected Inventory command, got {other:?}"),
    }
}

#[test]
fn inventory_accepts_several_directories() {
    let cli = Cli::parse_from(["iacscan", "inventory", "infra", "charts"]);
    match cli.command {
        Command::Inventory(args) => {
            assert_eq!(args.dirs, [Utf8PathBuf::from("infra"), Utf8PathBuf::from("charts")]);
        }
        other => panic!("expected Inventory command, got {other:?}"),
    }
}

#[rstest]
#[case::short(&["iacscan", "-vv", "context"], 2)]
#[case::long(&["iacscan", "context", "--verbose"], 1)]
#[case::after_subcommand(&["iacscan", "inventory", "-vvv"], 3)]
fn verbosity_is_global(#[case] args: &[&str], #[case] expected: u8) {
    let cli = Cli::parse_from(args.iter().copied());
    assert_eq!(cli.verbosity, expected);
}

#[test]
fn verbose_conflicts_with_quiet() {
    let result = Cli::try_parse_from(["iacscan", "-v", "-q", "inventory"]);
    assert!(result.is_err());
}

#[test]
fn config_path_is_global() {
    let cli = Cli::parse_from(["iacscan", "download", "list", "--config", "ci.toml"]);
    assert_eq!(cli.config, Some(Utf8PathBuf::from("ci.toml")));
}

#[test]
fn fingerprint_show_accepts_many_files() {
    let cli = Cli::parse_from(["iacscan", "fingerprint", "show", "a.tf", "b.tf"]);
    match cli.command {
        Command::Fingerprint(FingerprintCommand::Show { files }) => assert_eq!(files.len(), 2),
        other => panic!("expected fingerprint show, got {other:?}"),
    }
}

#[test]
fn fingerprint_diff_needs_two_files() {
    assert!(Cli::try_parse_from(["iacscan", "fingerprint", "diff", "a.tf"]).is_err());
    let cli = Cli::parse_from(["iacscan", "fingerprint", "diff", "a.tf", "b.tf"]);
    assert!(matches!(cli.command, Command::Fingerprint(FingerprintCommand::Diff { .. })));
}

#[test]
fn assess_collects_repeated_thresholds() {
    let cli = Cli::parse_from([
        "iacscan",
        "assess",
        "--findings",
        "out.json",
        "--fail",
        "medium=5",
        "--fail",
        "critical",
        "--drop-passed",
    ]);
    match cli.command {
        Command::Assess(args) => {
            assert_eq!(args.findings, Utf8PathBuf::from("out.json"));
            assert_eq!(args.fail, ["medium=5", "critical"]);
            assert!(args.drop_passed);
            assert!(args.dir.is_none());
        }
        other => panic!("expected Assess command, got {other:?}"),
    }
}

#[test]
fn assess_requires_findings() {
    assert!(Cli::try_parse_from(["iacscan", "assess"]).is_err());
}

#[test]
fn download_install_defaults_to_latest() {
    let cli = Cli::parse_from([
        "iacscan",
        "download",
        "install",
        "--url",
        "github.com/aquasecurity/tfsec",
    ]);
    match cli.command {
        Command::Download(DownloadCommand::Install(args)) => {
            assert_eq!(args.version, "");
            assert_eq!(args.url.as_deref(), Some("github.com/aquasecurity/tfsec"));
            assert!(args.name.is_none());
            assert!(!args.reinstall);
        }
        other => panic!("expected download install, got {other:?}"),
    }
}

#[rstest]
#[case::print_dir("print-dir")]
#[case::remove("remove")]
fn versioned_download_commands_need_a_name(#[case] subcommand: &str) {
    assert!(Cli::try_parse_from(["iacscan", "download", subcommand]).is_err());
    let cli = Cli::parse_from(["iacscan", "download", subcommand, "--name", "tfsec", "--version", "v1"]);
    match cli.command {
        Command::Download(DownloadCommand::PrintDir(args) | DownloadCommand::Remove(args)) => {
            assert_eq!(args.name, "tfsec");
            assert_eq!(args.version.as_deref(), Some("v1"));
        }
        other => panic!("expected a versioned download command, got {other:?}"),
    }
}

#[test]
fn download_clean_flags() {
    let cli = Cli::parse_from(["iacscan", "download", "clean", "--all"]);
    match cli.command {
        Command::Download(DownloadCommand::Clean { all, name }) => {
            assert!(all);
            assert!(name.is_none());
        }
        other => panic!("expected download clean, got {other:?}"),
    }
}
