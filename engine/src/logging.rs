use tracing_subscriber::{fmt, EnvFilter};

/// Initialises structured logging for a running engine process: env-filter
/// driven level control (`RUST_LOG`, defaulting to `info`) and JSON output
/// suited to log aggregation. Safe to call more than once per process —
/// a second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .try_init();
}
