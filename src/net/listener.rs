//! Loopback TCP listener.
//!
//! # Responsibilities
//! - Bind the passive socket to the configured loopback address
//! - Surface bind failures as a typed error (no retry)
//! - Hand the bound socket to the accept worker's runtime

use std::net::{SocketAddr, TcpListener as StdTcpListener};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured address does not parse.
    #[error("Invalid bind address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    /// The address is not on a loopback interface.
    #[error("Refusing to bind non-loopback address {0}")]
    NotLoopback(SocketAddr),

    /// Failed to bind to address (typically: port already in use).
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to read back the bound address or prepare the socket.
    #[error("Failed to prepare listener: {0}")]
    Setup(std::io::Error),
}

/// A bound, not yet accepting, loopback listener.
///
/// Binding happens synchronously on the caller's thread so that a bind
/// failure is reported to the session-start hook directly.
#[derive(Debug)]
pub struct Listener {
    inner: StdTcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address.
    pub fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr =
            config
                .bind_address
                .parse()
                .map_err(|source| ListenerError::InvalidAddress {
                    address: config.bind_address.clone(),
                    source,
                })?;

        if !addr.ip().is_loopback() {
            return Err(ListenerError::NotLoopback(addr));
        }

        let inner = StdTcpListener::bind(addr)
            .map_err(|source| ListenerError::Bind { address: addr, source })?;

        let local_addr = inner.local_addr().map_err(ListenerError::Setup)?;

        tracing::info!(address = %local_addr, "TCP server listening");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Convert into a Tokio listener. Must be called inside a runtime context.
    pub(crate) fn into_tokio(self) -> Result<TcpListener, ListenerError> {
        self.inner.set_nonblocking(true).map_err(ListenerError::Setup)?;
        TcpListener::from_std(self.inner).map_err(ListenerError::Setup)
    }
}
