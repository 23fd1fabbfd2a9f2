//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! listener / supervisor / driver / manager produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
