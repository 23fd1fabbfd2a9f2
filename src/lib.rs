//! Loopback TCP heartbeat bridge for game-host integrations.

pub mod config;
pub mod heartbeat;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::BridgeConfig;
pub use heartbeat::{HeartbeatDriver, Sentinel, TickOutcome};
pub use lifecycle::HostLifecycle;
pub use session::{BridgeError, BridgeState, ConnectionManager};
