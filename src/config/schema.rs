//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default heartbeat sentinel byte.
pub const DEFAULT_SENTINEL: u8 = 0xAA;

/// Root configuration for the heartbeat bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (loopback bind address).
    pub listener: ListenerConfig,

    /// Heartbeat protocol settings.
    pub heartbeat: HeartbeatConfig,

    /// Simulated host settings (used by the `heartbeat-bridge` binary only).
    pub host: HostConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:7777"). Must be a loopback address.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7777".to_string(),
        }
    }
}

/// Heartbeat protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// The single byte exchanged as the heartbeat.
    pub sentinel: u8,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

/// Tick source settings for the simulated host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Ticks per second.
    pub tick_rate_hz: u32,

    /// End the session after this many ticks. Runs until interrupted when unset.
    pub session_ticks: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            session_ticks: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
