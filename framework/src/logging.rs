//! Structured logging setup

use crate::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `app.log_level`; an invalid level falls back to
/// `info`. Returns false when a subscriber was already installed, which
/// makes repeated calls harmless.
pub fn init(config: &AppConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(config.debug))
        .try_init()
        .is_ok()
}
