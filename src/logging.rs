//! Structured logging to stderr.
//!
//! `SQUASH_LOG` takes a full [`EnvFilter`] directive (`squash=debug`,
//! `trace`, ...). Without it the level comes from the `-v` count.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::consts::LOG_ENV;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Map `-v` occurrences to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: u8) {
    let _ = TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
