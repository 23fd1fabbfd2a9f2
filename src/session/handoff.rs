//! Single-slot handoff between the accept worker and the tick thread.
//!
//! ```text
//! accept worker (SlotWriter)              tick thread (SlotReader)
//!     publish(conn) ──── connection ────▶ take()
//!     connected = true                    is_connected()
//!     wait_released() ◀── ConnectionId ── release(id), connected = false
//! ```
//!
//! The ConnectedFlag is raised only after the connection is in the slot, so
//! a reader that observes `true` is guaranteed to find it there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::net::{Connection, ConnectionId};

/// Create a connected writer/reader pair.
pub(crate) fn slot() -> (SlotWriter, SlotReader) {
    let (conn_tx, conn_rx) = mpsc::sync_channel(1);
    let (released_tx, released_rx) = unbounded_channel();
    let connected = Arc::new(AtomicBool::new(false));

    (
        SlotWriter {
            conn_tx,
            released_rx,
            connected: Arc::clone(&connected),
        },
        SlotReader {
            conn_rx,
            released_tx,
            connected,
        },
    )
}

/// Accept-worker side of the slot.
#[derive(Debug)]
pub(crate) struct SlotWriter {
    conn_tx: SyncSender<Connection>,
    released_rx: UnboundedReceiver<ConnectionId>,
    connected: Arc<AtomicBool>,
}

impl SlotWriter {
    /// Place a freshly accepted connection in the slot and raise the flag.
    ///
    /// Hands the connection back if the slot is occupied or the reader is gone.
    pub(crate) fn publish(&self, conn: Connection) -> Result<(), Connection> {
        self.conn_tx.try_send(conn).map_err(|e| match e {
            TrySendError::Full(conn) | TrySendError::Disconnected(conn) => conn,
        })?;
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    /// Wait until the tick thread tears the current connection down.
    ///
    /// `None` means the reader was dropped.
    pub(crate) async fn wait_released(&mut self) -> Option<ConnectionId> {
        self.released_rx.recv().await
    }
}

/// Tick-thread side of the slot.
#[derive(Debug)]
pub(crate) struct SlotReader {
    conn_rx: Receiver<Connection>,
    released_tx: UnboundedSender<ConnectionId>,
    connected: Arc<AtomicBool>,
}

impl SlotReader {
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Take the published connection, if any. Never blocks.
    pub(crate) fn take(&self) -> Option<Connection> {
        self.conn_rx.try_recv().ok()
    }

    /// Clear the flag and let the worker accept the next client.
    pub(crate) fn release(&self, id: ConnectionId) {
        self.connected.store(false, Ordering::Release);
        // The worker is gone only during shutdown, when nobody needs the wakeup.
        let _ = self.released_tx.send(id);
    }

    /// Clear the flag without waking the worker.
    pub(crate) fn clear(&self) {
        self.connected.store(false, Ordering::Release);
    }
}
