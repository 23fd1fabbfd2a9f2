//! Tick-driven heartbeat driver.
//!
//! Reads at most one byte per tick from a non-blocking transport and echoes
//! the sentinel back. It never owns the connection and never tears it down
//! itself; a `Disconnected` outcome tells the caller to do so.

use std::io::{self, Read, Write};

use crate::heartbeat::protocol::{DisconnectReason, Sentinel, TickOutcome};
use crate::observability::metrics;

/// Reacts to one byte per tick on the active connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatDriver {
    sentinel: Sentinel,
}

impl HeartbeatDriver {
    pub fn new(sentinel: Sentinel) -> Self {
        Self { sentinel }
    }

    pub fn sentinel(&self) -> Sentinel {
        self.sentinel
    }

    /// Run one tick against `transport`.
    ///
    /// `transport` must be non-blocking: `WouldBlock` means no data this tick.
    pub fn tick<T: Read + Write>(&self, transport: &mut T) -> TickOutcome {
        let mut byte = [0u8; 1];
        let read = loop {
            match transport.read(&mut byte) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match read {
            Ok(0) => TickOutcome::Disconnected(DisconnectReason::PeerClosed),
            Ok(_) if self.sentinel.matches(byte[0]) => {
                tracing::trace!(sentinel = %self.sentinel, "Received sentinel, echoing");
                match self.send(transport) {
                    Ok(()) => {
                        metrics::record_echo();
                        TickOutcome::Echoed
                    }
                    Err(e) => TickOutcome::Disconnected(DisconnectReason::Io(e)),
                }
            }
            Ok(_) => {
                tracing::debug!(byte = byte[0], "Ignoring non-sentinel byte");
                metrics::record_ignored_byte();
                TickOutcome::Ignored(byte[0])
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => TickOutcome::Quiet,
            Err(e) => TickOutcome::Disconnected(DisconnectReason::Io(e)),
        }
    }

    /// Write one sentinel byte and flush.
    pub fn send<W: Write>(&self, transport: &mut W) -> io::Result<()> {
        transport.write_all(&[self.sentinel.byte()])?;
        transport.flush()?;
        tracing::trace!(sentinel = %self.sentinel, "Sent sentinel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory non-blocking transport.
    #[derive(Default)]
    struct FakeTransport {
        incoming: VecDeque<io::Result<u8>>,
        eof: bool,
        written: Vec<u8>,
        fail_writes: bool,
    }

    impl FakeTransport {
        fn with_bytes(bytes: &[u8]) -> Self {
            Self {
                incoming: bytes.iter().copied().map(Ok).collect(),
                ..Self::default()
            }
        }
    }

    impl Read for FakeTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.incoming.pop_front() {
                Some(Ok(b)) => {
                    buf[0] = b;
                    Ok(1)
                }
                Some(Err(e)) => Err(e),
                None if self.eof => Ok(0),
                None => Err(io::ErrorKind::WouldBlock.into()),
            }
        }
    }

    impl Write for FakeTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn quiet_when_nothing_buffered() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::default();

        assert!(matches!(driver.tick(&mut transport), TickOutcome::Quiet));
        assert!(transport.written.is_empty());
    }

    #[test]
    fn echoes_sentinel() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::with_bytes(&[0xAA]);

        assert!(matches!(driver.tick(&mut transport), TickOutcome::Echoed));
        assert_eq!(transport.written, vec![0xAA]);
    }

    #[test]
    fn one_byte_per_tick() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::with_bytes(&[0xAA, 0xAA, 0xAA]);

        driver.tick(&mut transport);
        assert_eq!(transport.written, vec![0xAA]);
        assert_eq!(transport.incoming.len(), 2);

        driver.tick(&mut transport);
        driver.tick(&mut transport);
        assert_eq!(transport.written, vec![0xAA; 3]);
        assert!(matches!(driver.tick(&mut transport), TickOutcome::Quiet));
    }

    #[test]
    fn ignores_other_bytes_without_reply() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::with_bytes(&[0x01]);

        assert!(matches!(driver.tick(&mut transport), TickOutcome::Ignored(0x01)));
        assert!(transport.written.is_empty());
    }

    #[test]
    fn custom_sentinel() {
        let driver = HeartbeatDriver::new(Sentinel::new(0x7E));
        let mut transport = FakeTransport::with_bytes(&[0xAA, 0x7E]);

        assert!(matches!(driver.tick(&mut transport), TickOutcome::Ignored(0xAA)));
        assert!(matches!(driver.tick(&mut transport), TickOutcome::Echoed));
        assert_eq!(transport.written, vec![0x7E]);
    }

    #[test]
    fn end_of_stream_disconnects() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport {
            eof: true,
            ..FakeTransport::default()
        };

        assert!(matches!(
            driver.tick(&mut transport),
            TickOutcome::Disconnected(DisconnectReason::PeerClosed)
        ));
    }

    #[test]
    fn read_error_disconnects() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::default();
        transport
            .incoming
            .push_back(Err(io::ErrorKind::ConnectionReset.into()));

        match driver.tick(&mut transport) {
            TickOutcome::Disconnected(DisconnectReason::Io(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::ConnectionReset)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn interrupted_read_is_retried() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::default();
        transport
            .incoming
            .push_back(Err(io::ErrorKind::Interrupted.into()));
        transport.incoming.push_back(Ok(0xAA));

        assert!(matches!(driver.tick(&mut transport), TickOutcome::Echoed));
    }

    #[test]
    fn failed_echo_disconnects() {
        let driver = HeartbeatDriver::default();
        let mut transport = FakeTransport::with_bytes(&[0xAA]);
        transport.fail_writes = true;

        assert!(driver.tick(&mut transport).is_disconnect());
    }
}
