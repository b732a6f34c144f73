//! Telemetry helpers for hosts embedding `chart-join`.
//!
//! The crate only emits `tracing` events (join summaries, dropped rows, load
//! failures). Installing a subscriber stays the host's decision.

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`, falling back
/// to `default_directive` (for example `"chart_join=debug"`).
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_tracing(default_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_directive;
        false
    }
}
