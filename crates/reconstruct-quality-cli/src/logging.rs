//! Logger setup.

use env_logger::Env;

/// Install the global logger.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or
/// everything down to `debug` with `--verbose`.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
