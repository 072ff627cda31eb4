use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with env-filter (RUST_LOG), defaulting to info.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
