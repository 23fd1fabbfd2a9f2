//! Resilience helpers for heartbeat clients.
//!
//! # Data Flow
//! ```text
//! Client connect attempt refused
//!     → backoff.rs (next delay, exponential with jitter, capped)
//!     → sleep, try again
//! ```

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
