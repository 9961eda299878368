//! Log output setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the caller provide one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Build the active filter. `RUST_LOG` wins over `fallback`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install a global formatted subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one stays in place.
pub fn init_tracing(filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter(filter))
        .try_init()
        .is_ok()
}
