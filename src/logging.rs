//! Logger setup for the CLI.

use log::LevelFilter;

/// Maps `-v` repetitions and `-q` to a log level.
///
/// # Examples
///
/// ```
/// use iacscan::logging::level_for;
/// use log::LevelFilter;
///
/// assert_eq!(level_for(0, false), LevelFilter::Warn);
/// assert_eq!(level_for(2, false), LevelFilter::Debug);
/// assert_eq!(level_for(0, true), LevelFilter::Error);
/// ```
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs `env_logger` on stderr at the level chosen by the flags.
///
/// `RUST_LOG` takes precedence when set. Installing twice is harmless.
pub fn init(verbosity: u8, quiet: bool) {
    let result = env_logger::Builder::new()
        .filter_level(level_for(verbosity, quiet))
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
    if result.is_err() {
        log::debug!("logger already installed");
    }
}
