//! Tracing subscriber bootstrap, shared by every binary that embeds the
//! engine so log formatting stays consistent.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber reading level filters from
/// `JANITOR_LOG` (falling back to `info`). Idempotent: a second call is a
/// no-op rather than a panic, since tests may initialize it repeatedly.
pub fn init() {
    let filter = EnvFilter::try_from_env("JANITOR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
