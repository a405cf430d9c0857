#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Bridge Core
//!
//! `bridge_core` provides the building blocks shared by every rbridge crate:
//! the error hierarchy, the numeric vector type handed across the host
//! boundary, and configuration/logging utilities.
//!
//! ## Crate Structure
//!
//! - `error`: error types for runtime lifecycle, kernel and configuration failures
//! - `types`: data types exchanged with the host environment
//! - `utils`: configuration loading and log levels
//!
//! ## Integration with Other Bridge Crates
//!
//! - **bridge_concurrency**: runs the element-wise kernel and reports `KernelError`
//! - **bridge_runtime**: drives the embedded runtime and reports `LifecycleError`
//! - **bridge_ffi**: maps every error onto a C status code

pub mod error;
pub mod types;
pub mod utils;

// Re-export key types for easier access
pub use error::{ConfigError, Error, KernelError, LifecycleError, Result};
pub use types::NumericVector;
pub use utils::{BridgeConfig, KernelConfig, LogLevel, LoggingConfig, RuntimeConfig};
