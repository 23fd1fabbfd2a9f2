//! Established client connection.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Wrap the accepted stream in non-blocking mode for tick-driven polling
//! - Close the stream explicitly on teardown

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An established byte stream to exactly one client.
///
/// The stream is always non-blocking: a read with nothing buffered returns
/// `ErrorKind::WouldBlock` instead of parking the tick thread.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    stream: TcpStream,
}

impl Connection {
    /// Take over an accepted Tokio stream for synchronous, non-blocking use.
    pub(crate) fn from_tokio(
        stream: tokio::net::TcpStream,
        peer_addr: SocketAddr,
    ) -> io::Result<Self> {
        let stream = stream.into_std()?;
        stream.set_nonblocking(true)?;
        Ok(Self {
            id: ConnectionId::new(),
            peer_addr,
            stream,
        })
    }

    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Address of the connected client.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Shut down both directions and release the socket.
    pub fn close(self) {
        // The peer may already be gone; the descriptor is released on drop either way.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        tracing::trace!(connection_id = %self.id, peer = %self.peer_addr, "Connection closed");
    }
}
