//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → handed to the ConnectionManager and the demo host
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new session picks up a new config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BridgeConfig;
pub use schema::HeartbeatConfig;
pub use schema::HostConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use validation::ValidationError;
