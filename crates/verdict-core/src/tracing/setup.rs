//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Verdict tracing/logging system.
///
/// Reads the `VERDICT_LOG` environment variable for per-module log levels.
/// Format: `VERDICT_LOG=verdict_analysis::engine=debug,verdict_core=warn`
///
/// Falls back to `verdict=info` if `VERDICT_LOG` is not set or is invalid.
/// Idempotent; only the first call installs the subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("VERDICT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("verdict=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
