//! Process-wide tracing/logging setup.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Human-readable logs for local development (`LOG_FORMAT=pretty`).
pub fn init_pretty() {
    tracing::init_pretty();
}
