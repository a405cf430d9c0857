#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # rbridge
//!
//! The foreign-call surface loaded by the host statistical environment.
//!
//! - `HsStart` / `HsEnd` start and stop the embedded runtime when the
//!   extension is loaded and unloaded
//! - `parad` / `parad_into` compute the element-wise quotient of two numeric
//!   vectors on a call-scoped worker pool
//! - `bridge_last_error` reports why the last call on this thread failed
//!
//! Logging goes through `log`; an `env_logger` backend is installed on first
//! use, filtered by the configured level or `RBRIDGE_LOG`.

/// C ABI entry points
pub mod exports;

/// Process-wide configuration, runtime and kernel
pub mod host;

/// Status codes and per-thread error messages
pub mod status;

pub use exports::{
    bridge_last_error, bridge_vector_free, parad, parad_into, BridgeVector, HsEnd, HsStart,
};
pub use host::{kernel_totals, runtime_state, start_runtime, stop_runtime, HostRuntime, LOG_ENV};
pub use status::StatusCode;
