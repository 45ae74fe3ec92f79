//! Diagnostic logging setup
//!
//! Diagnostics go to stderr; stdout belongs to the hook's own output.

use tracing_subscriber::EnvFilter;

use crate::consts::LOG_ENV;

fn default_directive(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Initialize tracing. `SESSION_CAPTURE_LOG` overrides the flag-derived level.
pub(crate) fn init_logging(debug: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_line_number(debug)
        .try_init();
}
