//! Tracing subscriber setup.
//!
//! Events go to stderr so stdout stays clean for command output. The filter
//! comes from `RUST_LOG`, defaulting to `warn`.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

pub fn init() {
    // try_init: a second call (e.g. from tests) is ignored.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
