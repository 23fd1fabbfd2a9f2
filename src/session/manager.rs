//! Connection manager.
//!
//! Owns the listener (through its accept worker), the single connection
//! slot and the current connection. The host drives it from one thread:
//! `start_listening` at session start, `tick` once per host tick and
//! `stop_listening` at session end.
//!
//! ```text
//! [Idle] --start_listening--> [Listening] --client accepted--> [Connected]
//!   ^                             ^                                 |
//!   |                             +------- EOF / I/O error ---------+
//!   +--------------- stop_listening (from either) -----------------+
//! ```
//!
//! Each session's accept worker is a dedicated OS thread driving its own
//! current-thread runtime. Teardown joins that thread, so every call here
//! is safe from any host thread, including one that is itself running Tokio.

use std::net::SocketAddr;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tokio::runtime::Builder;

use crate::config::BridgeConfig;
use crate::heartbeat::{DisconnectReason, HeartbeatDriver, Sentinel, TickOutcome};
use crate::lifecycle::Shutdown;
use crate::net::{Connection, Listener, ListenerError};
use crate::observability::metrics;
use crate::session::handoff::{self, SlotReader};
use crate::session::supervisor::Supervisor;

/// Errors surfaced to the host when a session cannot start.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Failed to start accept worker: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Observable state of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No session; nothing is bound.
    Idle,
    /// Bound and waiting for a client.
    Listening,
    /// A client holds the connection slot.
    Connected,
}

/// Everything that exists only between session start and session end.
struct Session {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    worker: JoinHandle<()>,
    slot: SlotReader,
    current: Option<Connection>,
}

pub struct ConnectionManager {
    config: BridgeConfig,
    driver: HeartbeatDriver,
    session: Option<Session>,
}

impl ConnectionManager {
    /// Create an idle manager. Nothing is bound until `start_listening`.
    pub fn new(config: BridgeConfig) -> Self {
        let driver = HeartbeatDriver::new(Sentinel::new(config.heartbeat.sentinel));

        Self {
            config,
            driver,
            session: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        match &self.session {
            None => BridgeState::Idle,
            Some(session) if session.slot.is_connected() => BridgeState::Connected,
            Some(_) => BridgeState::Listening,
        }
    }

    /// The ConnectedFlag.
    pub fn is_connected(&self) -> bool {
        self.state() == BridgeState::Connected
    }

    /// Bound address while a session is active.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.session.as_ref().map(|s| s.local_addr)
    }

    /// Bind the listener and start the accept worker.
    ///
    /// A second call while listening does nothing and returns the bound
    /// address. Bind failures are returned as-is and not retried.
    pub fn start_listening(&mut self) -> Result<SocketAddr, BridgeError> {
        if let Some(session) = &self.session {
            tracing::debug!(address = %session.local_addr, "Already listening, ignoring start");
            return Ok(session.local_addr);
        }

        let listener = Listener::bind(&self.config.listener)?;
        let local_addr = listener.local_addr();

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BridgeError::Runtime)?;
        let listener = {
            let _guard = runtime.enter();
            listener.into_tokio()?
        };

        let shutdown = Shutdown::new();
        let (writer, slot) = handoff::slot();
        let supervisor = Supervisor::new(
            listener,
            self.driver.sentinel(),
            writer,
            shutdown.subscribe(),
        );

        // The runtime lives and dies on the worker thread.
        let worker = thread::Builder::new()
            .name("heartbeat-accept".into())
            .spawn(move || runtime.block_on(supervisor.run()))
            .map_err(BridgeError::Runtime)?;

        self.session = Some(Session {
            local_addr,
            shutdown,
            worker,
            slot,
            current: None,
        });

        Ok(local_addr)
    }

    /// Run the heartbeat driver once. Never blocks.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };

        if session.current.is_none() {
            session.current = session.slot.take();
        }

        let Some(conn) = session.current.as_mut() else {
            return TickOutcome::Idle;
        };

        let outcome = self.driver.tick(conn);
        if let TickOutcome::Disconnected(reason) = &outcome {
            self.disconnect(reason);
        }
        outcome
    }

    /// Close the current connection and offer the slot to the next client.
    fn disconnect(&mut self, reason: &DisconnectReason) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(conn) = session.current.take() else {
            return;
        };

        let id = conn.id();
        let peer = conn.peer_addr();
        match reason {
            DisconnectReason::PeerClosed => {
                tracing::warn!(connection_id = %id, peer = %peer, "Client disconnected")
            }
            DisconnectReason::Io(e) => {
                tracing::error!(connection_id = %id, peer = %peer, error = %e, "Connection error")
            }
        }
        metrics::record_disconnect(reason.label());
        metrics::set_connected(false);

        conn.close();
        session.slot.release(id);

        tracing::info!("Waiting for client to reconnect");
    }

    /// Close the connection and the listener. Safe to call when idle.
    pub fn stop_listening(&mut self) {
        let Some(mut session) = self.session.take() else {
            tracing::debug!("Not listening, nothing to stop");
            return;
        };

        session.slot.clear();
        if let Some(conn) = session.current.take() {
            conn.close();
        }
        session.shutdown.trigger();

        if session.worker.join().is_err() {
            tracing::error!("Accept worker panicked");
        }

        // Published but never picked up by a tick.
        if let Some(conn) = session.slot.take() {
            conn.close();
        }

        metrics::set_connected(false);
        tracing::info!(address = %session.local_addr, "TCP server stopped");
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop_listening();
    }
}
