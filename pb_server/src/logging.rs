//! Structured logging configuration.
//!
//! The library logs through the `log` facade; those records are forwarded
//! into the `tracing` subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` isn't set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var. Each line
/// carries its target, thread, and source location, so a table's thread
/// can be followed through the log.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}
