//! Utility modules.
//!
//! - `config`: TOML configuration with environment overrides
//! - `logging`: serializable log levels

pub mod config;
pub mod logging;

pub use config::{BridgeConfig, KernelConfig, LoggingConfig, RuntimeConfig};
pub use logging::LogLevel;
