use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging for one invocation.
///
/// Honors `RUST_LOG`; falls back to `info`. Must be called once, first
/// thing in `main`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    debug!("Logging initialized");
}
