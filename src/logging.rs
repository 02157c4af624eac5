use tracing_subscriber::EnvFilter;

/// Initialise logging. Defaults to `info`; `RUST_LOG` overrides, which is
/// how the per-event `debug` lines from the surface are switched on.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
