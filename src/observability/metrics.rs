//! Metrics collection and exposition.
//!
//! # Metrics
//! - `heartbeat_connections_accepted_total` (counter)
//! - `heartbeat_disconnects_total` (counter): labelled by reason
//! - `heartbeat_echoes_total` (counter)
//! - `heartbeat_ignored_bytes_total` (counter)
//! - `heartbeat_connected` (gauge): 1=client connected, 0=waiting
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_connection_accepted() {
    counter!("heartbeat_connections_accepted_total").increment(1);
}

pub fn record_disconnect(reason: &'static str) {
    counter!("heartbeat_disconnects_total", "reason" => reason).increment(1);
}

pub fn record_echo() {
    counter!("heartbeat_echoes_total").increment(1);
}

pub fn record_ignored_byte() {
    counter!("heartbeat_ignored_bytes_total").increment(1);
}

pub fn set_connected(connected: bool) {
    gauge!("heartbeat_connected").set(if connected { 1.0 } else { 0.0 });
}
