//! Heartbeat subsystem.
//!
//! # Data Flow
//! ```text
//! Host tick
//!     → driver.rs (non-blocking read of at most one byte)
//!     → sentinel?  write sentinel back
//!     → other?     drop it
//!     → EOF/error? report Disconnected to the connection manager
//! ```

pub mod driver;
pub mod protocol;

pub use driver::HeartbeatDriver;
pub use protocol::{DisconnectReason, Sentinel, TickOutcome};
