#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! Bridge Runtime - lifecycle of the embedded managed runtime
//!
//! The host process owns exactly one embedded runtime. This crate models it
//! as an explicit `Stopped`/`Running` state machine whose transitions are
//! checked, so a double start or a stop without a start is reported as a
//! `LifecycleError` instead of corrupting runtime state.

pub mod system;

pub use system::{
    DetachedRuntime, EmbeddedRuntime, RuntimeGuard, RuntimeLifecycle, RuntimeState,
};

#[cfg(feature = "ghc-rts")]
pub use system::GhcRuntime;
