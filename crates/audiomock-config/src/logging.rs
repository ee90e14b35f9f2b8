//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Output goes through the test writer so `cargo test` captures it. Returns
/// `false` if a subscriber was already installed; repeated calls are harmless.
pub fn init_logging() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_test_writer()
        .try_init()
        .is_ok()
}
