//! Heartbeat bridge demo host.
//!
//! Drives the bridge the way a game host would: one session, a fixed tick
//! rate, and the three lifecycle hooks.
//!
//! # Architecture Overview
//!
//! ```text
//!   host thread (SimulatedHost)                 accept worker (Tokio, 1 thread)
//!   ──────────────────────────                  ───────────────────────────────
//!   on_session_started ── bind ───────────────▶ accept ─▶ send sentinel
//!                                                   │
//!                                  ┌── slot ◀───────┘  (connection + flag)
//!                                  ▼
//!   on_tick ──▶ HeartbeatDriver: read ≤1 byte, echo sentinel
//!                    │
//!                    └─ EOF / error ─▶ close, release slot ─▶ accept again
//!
//!   on_session_ended ── shutdown broadcast ───▶ worker exits, listener closed
//! ```

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use heartbeat_bridge::config::validation::validate_config;
use heartbeat_bridge::config::{load_config, BridgeConfig, ConfigError};
use heartbeat_bridge::lifecycle::{signals, SimulatedHost};
use heartbeat_bridge::observability::{logging, metrics};
use heartbeat_bridge::ConnectionManager;

#[derive(Parser)]
#[command(name = "heartbeat-bridge")]
#[command(about = "Run a simulated game session with the loopback heartbeat bridge", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override host.tick_rate_hz.
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Override host.session_ticks.
    #[arg(long)]
    session_ticks: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(rate) = cli.tick_rate {
        config.host.tick_rate_hz = rate;
    }
    if cli.session_ticks.is_some() {
        config.host.session_ticks = cli.session_ticks;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("heartbeat-bridge v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        sentinel = config.heartbeat.sentinel,
        tick_rate_hz = config.host.tick_rate_hz,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let stop = Arc::new(AtomicBool::new(false));
    signals::watch_interrupt(Arc::clone(&stop))?;

    let host = SimulatedHost::new(&config.host);
    let mut manager = ConnectionManager::new(config);
    host.run(&mut manager, &stop);

    tracing::info!("Shutdown complete");
    Ok(())
}
