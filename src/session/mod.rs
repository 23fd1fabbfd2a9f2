//! Session subsystem: the Connection Manager and its accept worker.
//!
//! # Data Flow
//! ```text
//! start_listening
//!     → bind listener
//!     → spawn supervisor.rs (accept, send sentinel, publish)
//!     → handoff.rs slot (connection + ConnectedFlag)
//!     → manager.rs tick (take connection, run HeartbeatDriver)
//!     → on EOF/error: close, release slot, supervisor accepts again
//! ```
//!
//! # Design Decisions
//! - One persistent worker per session instead of a thread per reconnection
//! - Cross-thread state is an explicit single-slot handoff, not shared fields
//! - Reconnection is unconditional and unbounded for the session's lifetime

mod handoff;
pub mod manager;
mod supervisor;

pub use manager::{BridgeError, BridgeState, ConnectionManager};
