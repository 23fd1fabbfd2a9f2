//! OS signal handling.
//!
//! # Responsibilities
//! - Watch for Ctrl+C (SIGINT) on a dedicated thread
//! - Translate it into the host's stop flag
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The tick loop stays synchronous; it only polls the flag

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Set `stop` when Ctrl+C is received.
pub fn watch_interrupt(stop: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("heartbeat-signals".into())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutdown signal received");
                        stop.store(true, Ordering::Relaxed);
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
                }
            });
        })?;

    Ok(())
}
