//! `larder-observability` — shared logging/tracing setup for hosts of the
//! stock ledger.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    crate::tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
