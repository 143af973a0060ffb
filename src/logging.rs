//! Logging setup for embedding applications.
//!
//! The crate itself only emits `tracing` events; hosts that want to see
//! them can call [`init`] once at startup instead of wiring their own
//! subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize a compact tracing subscriber with env-based filtering.
///
/// Reads `RUST_LOG` to set the filter and falls back to `default_level`
/// (e.g. `"info"` or `"crmetrics=debug"`) when it is unset. Panics if a
/// global subscriber is already installed; use [`try_init`] when that
/// may be the case.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Like [`init`], but reports instead of panicking when a subscriber is
/// already set. Useful in tests and in hosts with their own telemetry.
pub fn try_init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_is_reentrant() {
        // First call installs a subscriber, the second reports failure
        // instead of panicking.
        let _ = try_init("info");
        assert!(try_init("debug").is_err());
    }
}
