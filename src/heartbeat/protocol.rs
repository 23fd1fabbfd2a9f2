//! Heartbeat wire protocol.
//!
//! ```text
//! server                       client
//!   | ---- sentinel (on accept) --> |
//!   | <--------- sentinel --------- |
//!   | ---------- sentinel --------> |   once per tick at most
//!   |              ...              |
//! ```
//!
//! No framing and no payload: the sentinel byte is both the message and
//! the acknowledgment. Any other byte is out of protocol and ignored.

use std::fmt;
use std::io;

use crate::config::schema::DEFAULT_SENTINEL;

/// The single byte exchanged as the heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sentinel(u8);

impl Sentinel {
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    pub const fn byte(self) -> u8 {
        self.0
    }

    pub fn matches(self, byte: u8) -> bool {
        self.0 == byte
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self(DEFAULT_SENTINEL)
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04X}", self.0)
    }
}

/// Why a connection was torn down.
#[derive(Debug)]
pub enum DisconnectReason {
    /// The peer closed the stream cleanly (end of stream).
    PeerClosed,
    /// Any read or write failure.
    Io(io::Error),
}

impl DisconnectReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DisconnectReason::PeerClosed => "peer_closed",
            DisconnectReason::Io(_) => "io_error",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::PeerClosed => write!(f, "peer closed the connection"),
            DisconnectReason::Io(e) => write!(f, "connection error: {}", e),
        }
    }
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// No connection is established.
    Idle,
    /// Connected, nothing to read this tick.
    Quiet,
    /// A sentinel arrived and one was written back.
    Echoed,
    /// A non-sentinel byte arrived and was dropped.
    Ignored(u8),
    /// The connection ended and has been torn down.
    Disconnected(DisconnectReason),
}

impl TickOutcome {
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TickOutcome::Disconnected(_))
    }
}
