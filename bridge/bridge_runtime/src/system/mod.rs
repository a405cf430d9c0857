//! System management for the embedded runtime
//!
//! - `embedded`: the `EmbeddedRuntime` seam and the detached implementation
//! - `lifecycle`: the guarded start/stop state machine
//! - `ghc`: binding to the GHC runtime system (feature `ghc-rts`)

pub mod embedded;
#[cfg(feature = "ghc-rts")]
pub mod ghc;
pub mod lifecycle;

// Re-export key types for convenience
pub use embedded::{DetachedRuntime, EmbeddedRuntime};
#[cfg(feature = "ghc-rts")]
pub use ghc::GhcRuntime;
pub use lifecycle::{RuntimeGuard, RuntimeLifecycle, RuntimeState};
