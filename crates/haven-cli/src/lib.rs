//! Haven CLI support library.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for command-line tools.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "haven=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
