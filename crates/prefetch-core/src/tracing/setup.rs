//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default filter when `PREFETCH_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "prefetch_storage=info,prefetch_core=info";

/// Initialize logging for the predictor.
///
/// Reads the `PREFETCH_LOG` environment variable for per-crate log levels,
/// e.g. `PREFETCH_LOG=prefetch_storage=debug,prefetch_core=warn`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PREFETCH_LOG")
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
}
