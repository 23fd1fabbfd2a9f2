//! Persistent accept worker.
//!
//! One task per session. It loops "accept, handshake, publish, wait for
//! release" until the session's shutdown signal fires. While a client holds
//! the slot no further `accept` is issued, so later clients queue in the
//! listener backlog until the current one is released.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::heartbeat::Sentinel;
use crate::net::Connection;
use crate::observability::metrics;
use crate::session::handoff::SlotWriter;

/// Pause after a failed `accept` on a live listener (e.g. descriptor exhaustion).
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(100);

pub(crate) struct Supervisor {
    listener: TcpListener,
    sentinel: Sentinel,
    slot: SlotWriter,
    shutdown: broadcast::Receiver<()>,
}

impl Supervisor {
    pub(crate) fn new(
        listener: TcpListener,
        sentinel: Sentinel,
        slot: SlotWriter,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            listener,
            sentinel,
            slot,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tracing::info!("Waiting for client to connect");

            // Shutdown while parked in accept is the expected way out; it is not reported.
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = self.shutdown.recv() => break,
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_PAUSE).await;
                    continue;
                }
            };

            let conn = match self.establish(stream, peer).await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(peer = %peer, error = %e, "Failed to send handshake sentinel");
                    metrics::record_disconnect("io_error");
                    continue;
                }
            };

            let id = conn.id();
            tracing::info!(connection_id = %id, peer = %peer, "Client connected");
            metrics::record_connection_accepted();
            metrics::set_connected(true);

            if let Err(conn) = self.slot.publish(conn) {
                conn.close();
                break;
            }

            tokio::select! {
                released = self.slot.wait_released() => {
                    if released.is_none() {
                        break;
                    }
                }
                _ = self.shutdown.recv() => break,
            }
        }

        tracing::debug!("Accept worker exiting");
    }

    /// Disable coalescing, prime the client with one sentinel, then hand the
    /// stream over to non-blocking mode.
    async fn establish(&self, mut stream: TcpStream, peer: SocketAddr) -> io::Result<Connection> {
        stream.set_nodelay(true)?;
        send_handshake(self.sentinel, &mut stream).await?;
        Connection::from_tokio(stream, peer)
    }
}

/// Write the unprompted sentinel that opens every connection.
async fn send_handshake<W: AsyncWrite + Unpin>(sentinel: Sentinel, writer: &mut W) -> io::Result<()> {
    writer.write_all(&[sentinel.byte()]).await?;
    writer.flush().await?;
    tracing::trace!(sentinel = %sentinel, "Sent sentinel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Instant;

    use tokio::io::AsyncReadExt;
    use tokio::time::timeout;

    use crate::lifecycle::Shutdown;
    use crate::session::handoff;

    const WAIT: Duration = Duration::from_secs(2);

    /// A writer whose peer is already gone.
    struct ResetWriter;

    impl AsyncWrite for ResetWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn handshake_writes_one_sentinel() {
        let mut out = Vec::new();
        send_handshake(Sentinel::new(0x55), &mut out).await.unwrap();
        assert_eq!(out, vec![0x55]);
    }

    #[tokio::test]
    async fn handshake_write_failure_is_returned() {
        let err = send_handshake(Sentinel::default(), &mut ResetWriter)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn reset_client_does_not_stop_accepting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Queue a client that resets before the worker gets to it.
        let doomed = TcpStream::connect(addr).await.unwrap();
        #[allow(deprecated)]
        doomed.set_linger(Some(Duration::ZERO)).unwrap();
        drop(doomed);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (writer, reader) = handoff::slot();
        let shutdown = Shutdown::new();
        let worker = tokio::spawn(
            Supervisor::new(listener, Sentinel::default(), writer, shutdown.subscribe()).run(),
        );

        let mut next = TcpStream::connect(addr).await.unwrap();
        let next_addr = next.local_addr().unwrap();

        let deadline = Instant::now() + WAIT;
        let published = loop {
            if let Some(conn) = reader.take() {
                if conn.peer_addr() == next_addr {
                    break conn;
                }
                // The reset peer got past the handshake; tear it down like a tick would.
                reader.release(conn.id());
            }
            assert!(Instant::now() < deadline, "second client was never published");
            tokio::time::sleep(Duration::from_millis(5)).await;
        };

        let mut byte = [0u8; 1];
        timeout(WAIT, next.read_exact(&mut byte))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(byte[0], Sentinel::default().byte());
        assert!(reader.is_connected());

        shutdown.trigger();
        timeout(WAIT, worker).await.unwrap().unwrap();
        published.close();
    }
}
