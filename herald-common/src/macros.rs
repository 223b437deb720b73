/// Central error reporting point. Everything that is considered a bug or an
/// unexpected runtime failure should be reported through here.
#[macro_export]
macro_rules! err {
    ($($t:tt)*) => {{
        tracing::error!($($t)*);
    }}
}

/// Installs the global tracing subscriber. Respects `RUST_LOG`, defaulting to
/// `info`. Safe to call more than once (later calls are no-ops).
#[macro_export]
macro_rules! tracing_init {
    () => {{
        let filter = ::tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| ::tracing_subscriber::EnvFilter::new("info"));

        ::tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init()
            .ok();
    }};
}
