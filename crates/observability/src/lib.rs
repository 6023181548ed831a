//! Process-wide tracing setup shared by the server binary and tests.

pub mod tracing;

/// Initialize tracing/logging once for the process.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Human-readable variant for local runs (`LOG_FORMAT=pretty`).
pub fn init_pretty() {
    tracing::init(tracing::LogFormat::Pretty);
}
