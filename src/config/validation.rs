//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce a loopback-only listener address
//! - Validate value ranges (tick rate, session length)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BridgeConfig;

/// Highest tick rate the simulated host accepts.
pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.bind_address {0} is not a loopback address")]
    NotLoopback(SocketAddr),

    #[error("host.tick_rate_hz must be between 1 and {MAX_TICK_RATE_HZ}, got {0}")]
    TickRateOutOfRange(u32),

    #[error("host.session_ticks must be greater than zero when set")]
    EmptySession,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.listener.bind_address.parse::<SocketAddr>() {
        Ok(addr) if !addr.ip().is_loopback() => errors.push(ValidationError::NotLoopback(addr)),
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        )),
    }

    let rate = config.host.tick_rate_hz;
    if rate == 0 || rate > MAX_TICK_RATE_HZ {
        errors.push(ValidationError::TickRateOutOfRange(rate));
    }

    if config.host.session_ticks == Some(0) {
        errors.push(ValidationError::EmptySession);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
