use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "Opticore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "opticore=info"
}

/// Initialize the global tracing subscriber.
///
/// Called once by the embedding application at startup. Honors `RUST_LOG`,
/// falling back to [`default_log_filter`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();
}
