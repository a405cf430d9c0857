//! Worker pools for parallel-for execution.
//!
//! Workers live only for the duration of one call: they are spawned on entry
//! and joined before the call returns.

pub mod partition;
pub mod scoped;

pub use partition::Partition;
pub use scoped::{ScopedPool, ScopedPoolConfig, ScopedPoolStats};
