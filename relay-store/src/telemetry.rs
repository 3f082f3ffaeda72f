//! Tracing bootstrap
//!
//! Library code only emits `tracing` events; binaries and tests embedding
//! the store call [`init_tracing`] once to see them.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (e.g. `"relay_store=debug"`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
