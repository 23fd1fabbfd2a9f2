//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binaries
//! - Let `RUST_LOG` override the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `default_level` applies when `RUST_LOG` is unset.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("heartbeat_bridge={level},heartbeat_probe={level}", level = default_level).into()
    });

    // A second call (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
