//! Shared utilities for heartbeat bridge integration tests.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use heartbeat_bridge::config::ListenerConfig;
use heartbeat_bridge::{BridgeConfig, ConnectionManager};

pub const SENTINEL: u8 = 0xAA;

/// How long a single client read waits before giving up.
const READ_SLICE: Duration = Duration::from_millis(10);

/// Pause between simulated ticks.
const TICK: Duration = Duration::from_millis(5);

/// Bridge config bound to an ephemeral loopback port.
pub fn ephemeral_config() -> BridgeConfig {
    BridgeConfig {
        listener: ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
        },
        ..BridgeConfig::default()
    }
}

/// Create a manager and start listening; returns it with its bound address.
pub fn start_bridge(config: BridgeConfig) -> (ConnectionManager, SocketAddr) {
    let mut manager = ConnectionManager::new(config);
    let addr = manager.start_listening().unwrap();
    (manager, addr)
}

/// Connect a client with short read timeouts.
pub fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(READ_SLICE)).unwrap();
    stream.set_nodelay(true).unwrap();
    stream
}

/// Outcome of one short client read.
#[derive(Debug, PartialEq, Eq)]
pub enum Read1 {
    Byte(u8),
    Nothing,
    Eof,
}

pub fn read_once(client: &mut TcpStream) -> Read1 {
    let mut byte = [0u8; 1];
    match client.read(&mut byte) {
        Ok(0) => Read1::Eof,
        Ok(_) => Read1::Byte(byte[0]),
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            Read1::Nothing
        }
        // A reset is end of stream as far as these tests care.
        Err(_) => Read1::Eof,
    }
}

/// Read one byte without ticking (the handshake needs no tick).
pub fn wait_for_byte(client: &mut TcpStream, timeout: Duration) -> Option<u8> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        match read_once(client) {
            Read1::Byte(b) => return Some(b),
            Read1::Eof => return None,
            Read1::Nothing => {}
        }
    }
    None
}

/// Tick the bridge until the client receives a byte or `timeout` elapses.
pub fn pump_for_byte(
    manager: &mut ConnectionManager,
    client: &mut TcpStream,
    timeout: Duration,
) -> Option<u8> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        manager.tick();
        match read_once(client) {
            Read1::Byte(b) => return Some(b),
            Read1::Eof => return None,
            Read1::Nothing => {}
        }
    }
    None
}

/// Tick the bridge until `done` holds or `timeout` elapses.
pub fn tick_until<F>(manager: &mut ConnectionManager, timeout: Duration, mut done: F) -> bool
where
    F: FnMut(&ConnectionManager) -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done(&*manager) {
            return true;
        }
        manager.tick();
        thread::sleep(TICK);
    }
    done(&*manager)
}

/// Connect, consume the handshake sentinel and wait for the flag.
pub fn connect_and_handshake(manager: &mut ConnectionManager, addr: SocketAddr) -> TcpStream {
    let mut client = connect(addr);
    assert_eq!(
        wait_for_byte(&mut client, Duration::from_secs(2)),
        Some(SENTINEL),
        "handshake sentinel"
    );
    assert!(tick_until(manager, Duration::from_secs(2), |m| m.is_connected()));
    client
}

pub fn send(client: &mut TcpStream, bytes: &[u8]) {
    client.write_all(bytes).unwrap();
    client.flush().unwrap();
}
