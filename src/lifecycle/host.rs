//! Simulated game host.
//!
//! Stands in for the real host runtime: starts a session, fires ticks at a
//! fixed rate and ends the session after a tick budget or when asked to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::HostConfig;
use crate::lifecycle::hooks::HostLifecycle;

pub struct SimulatedHost {
    tick_interval: Duration,
    session_ticks: Option<u64>,
}

impl SimulatedHost {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(1) / config.tick_rate_hz.max(1),
            session_ticks: config.session_ticks,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Run one session to completion and return the number of ticks delivered.
    pub fn run<H: HostLifecycle>(&self, hooks: &mut H, stop: &AtomicBool) -> u64 {
        tracing::info!(
            tick_interval = ?self.tick_interval,
            session_ticks = ?self.session_ticks,
            "Session started"
        );
        hooks.on_session_started();

        let mut ticks = 0u64;
        let mut next = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            if self.session_ticks.is_some_and(|limit| ticks >= limit) {
                break;
            }

            hooks.on_tick();
            ticks += 1;

            next += self.tick_interval;
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            } else {
                // Fell behind; don't burst to catch up.
                next = now;
            }
        }

        hooks.on_session_ended();
        tracing::info!(ticks, "Session ended");
        ticks
    }
}
