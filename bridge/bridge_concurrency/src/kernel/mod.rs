//! Element-wise numeric kernels.
//!
//! - `elementwise`: the generic kernel, the `Divide` operation and `parad`
//! - `stats`: per-call statistics and cumulative counters

pub mod elementwise;
pub mod stats;

pub use elementwise::{parad, parad_with, Divide, ElementwiseKernel, ElementwiseOp, KernelOptions};
pub use stats::{KernelStats, KernelTotals, KernelTotalsSnapshot};
