//! `freshen_log` v1:
//! tracing subscriber setup shared by the `freshen` binaries.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is not set.
///
/// `quiet` wins over `verbose`; per-leaf progress is logged at `info`.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info,globset=warn",
        1 => "debug,globset=warn",
        _ => "trace",
    }
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the CLI verbosity.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout)
        .try_init();
}
