//! Telemetry helpers for structured logging.

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "prometheus_event_pool=info";

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`]. Does nothing if a global subscriber is already set,
/// so applications can install their own first.
///
/// Returns `true` if this call installed the subscriber.
pub fn init_tracing() -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .is_ok()
}
