//! Tracing/logging initialization.
//!
//! One JSON line per event, filter driven by `RUST_LOG`. Correlation ids and
//! layered exporters can hang off this later without touching callers.

use tracing_subscriber::EnvFilter;

/// Initialize logging for the process with the `info` fallback filter.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init() {
    init_with_default("info");
}

/// Initialize logging with an explicit fallback filter (`RUST_LOG` still
/// wins when set). Tests use this to quiet noisy targets.
pub fn init_with_default(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_current_span(false)
        .with_target(false)
        .try_init();
}
