// src/logging.rs

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes logging for the driver binary.
///
/// `RUST_LOG` overrides the default `info` level, e.g.
/// `RUST_LOG=replenishment_engine=debug`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Logging for tests: debug level, captured by the test harness. Safe to
/// call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
