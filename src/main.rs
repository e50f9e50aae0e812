//! iacscan CLI entrypoint.

use clap::Parser;
use iacscan::cli::Cli;
use iacscan::config::Config;
use iacscan::error::Result;
use iacscan::{Outcome, dispatch, logging};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbosity, cli.quiet);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<Outcome> {
    let config = Config::load(cli.config.as_deref().map(camino::Utf8Path::as_std_path))?;
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    let outcome = dispatch(cli, &config, &mut stdin, &mut stdout)?;
    stdout.flush()?;
    if outcome == Outcome::AssessmentFailed && !cli.quiet {
        write_stderr_line(stderr, "assessment failed");
    }
    Ok(outcome)
}

fn exit_code_for_run_result(result: Result<Outcome>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
