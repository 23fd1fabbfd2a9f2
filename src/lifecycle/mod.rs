//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Host (host.rs or a real game runtime):
//!     session started → ConnectionManager::start_listening
//!     tick            → ConnectionManager::tick
//!     session ended   → ConnectionManager::stop_listening
//!
//! Shutdown (shutdown.rs):
//!     stop_listening → broadcast → accept worker exits → listener closed
//!
//! Signals (signals.rs):
//!     SIGINT → stop flag → host ends the session
//! ```

pub mod hooks;
pub mod host;
pub mod shutdown;
pub mod signals;

pub use hooks::HostLifecycle;
pub use host::SimulatedHost;
pub use shutdown::Shutdown;
