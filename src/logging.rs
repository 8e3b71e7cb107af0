//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `log`; result lines are written to
//! stdout by the sink and never pass through here.

/// Filter level for a `-v` count and `--quiet`.
pub fn level_filter(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global logger. `RUST_LOG` takes precedence over the flags.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let env = env_logger::Env::default().default_filter_or(level_filter(verbosity, quiet));
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
