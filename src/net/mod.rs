//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Session start
//!     → listener.rs (synchronous loopback bind, typed bind errors)
//!     → session supervisor (blocking accept on the worker runtime)
//!     → connection.rs (non-blocking stream handed to the tick thread)
//! ```
//!
//! # Design Decisions
//! - Loopback only; the listener never faces the network
//! - One connection slot; further clients wait in the kernel backlog
//! - Connections are polled, never blocked on, from the tick thread

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionId};
pub use listener::{Listener, ListenerError};
