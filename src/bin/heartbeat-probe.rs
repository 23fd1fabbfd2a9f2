use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use heartbeat_bridge::config::schema::DEFAULT_SENTINEL;
use heartbeat_bridge::lifecycle::signals;
use heartbeat_bridge::observability::logging;
use heartbeat_bridge::resilience::Backoff;

/// How often a blocked read wakes up to check for Ctrl+C.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(name = "heartbeat-probe")]
#[command(about = "Reference client for the loopback heartbeat bridge", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:7777")]
    address: SocketAddr,

    #[arg(short, long, default_value_t = DEFAULT_SENTINEL)]
    sentinel: u8,

    /// Stop after this many round trips.
    #[arg(short, long)]
    max_round_trips: Option<u64>,

    /// First reconnect delay in milliseconds.
    #[arg(long, default_value_t = 250)]
    retry_base_ms: u64,

    /// Longest reconnect delay in milliseconds.
    #[arg(long, default_value_t = 2000)]
    retry_max_ms: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let stop = Arc::new(AtomicBool::new(false));
    signals::watch_interrupt(Arc::clone(&stop))?;

    println!("Connecting to {}...", cli.address);
    let Some(mut stream) = connect(&cli, &stop)? else {
        return Ok(());
    };
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    println!("Connected! Waiting for first sentinel...");

    let mut count = 0u64;
    let mut byte = [0u8; 1];
    while !stop.load(Ordering::Relaxed) {
        match stream.read(&mut byte) {
            Ok(0) => {
                println!("Connection closed by server.");
                break;
            }
            Ok(_) if byte[0] == cli.sentinel => {
                count += 1;
                println!("[{count}] Got {:#04X} -> sending it back", cli.sentinel);
                stream.write_all(&[cli.sentinel])?;
                if cli.max_round_trips.is_some_and(|max| count >= max) {
                    break;
                }
            }
            Ok(_) => tracing::debug!(byte = byte[0], "Ignoring unexpected byte"),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    println!("Stopped after {count} round-trips.");
    Ok(())
}

/// Connect, retrying with backoff while the bridge is not listening yet.
fn connect(cli: &Cli, stop: &AtomicBool) -> io::Result<Option<TcpStream>> {
    let mut backoff = Backoff::new(cli.retry_base_ms, cli.retry_max_ms);
    loop {
        match TcpStream::connect(cli.address) {
            Ok(stream) => {
                if backoff.attempts() > 0 {
                    println!("  Connected after {} retries", backoff.attempts());
                }
                return Ok(Some(stream));
            }
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                let delay = backoff.next_delay();
                println!("  Server not up yet, retrying in {:?}...", delay);
                std::thread::sleep(delay);
                if stop.load(Ordering::Relaxed) {
                    return Ok(None);
                }
            }
            Err(e) => return Err(e),
        }
    }
}
