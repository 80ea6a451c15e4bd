//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default filter when `SLATE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "slate_core=info,slate_engine=info";

/// Initialize the slate tracing/logging system.
///
/// Reads `SLATE_LOG` for per-crate log levels.
/// Format: `SLATE_LOG=slate_engine::optimizer=debug,slate_engine::simulation=info`
///
/// Idempotent; later calls are no-ops.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("SLATE_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

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
        if let Err(e) = installed {
            tracing::debug!(error = %e, "global subscriber already set, keeping it");
        }
    });
}
