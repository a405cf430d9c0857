#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Bridge Concurrency
//!
//! Data-parallel execution for the rbridge host extension.
//!
//! This crate provides:
//!
//! - A call-scoped worker pool that partitions an output buffer into disjoint
//!   chunks and joins every worker before returning
//! - The parallel element-wise kernel (`parad`) built on top of it
//!
//! Concurrency is always an explicit per-call parameter. Nothing in this crate
//! mutates process-wide pool settings, so kernel calls issued from several
//! host threads at once do not interfere with each other.

/// Call-scoped worker pools
pub mod pool;

/// Element-wise numeric kernels
pub mod kernel;

// Re-export key types for easier access
pub use kernel::{
    parad, parad_with, Divide, ElementwiseKernel, ElementwiseOp, KernelOptions, KernelStats,
    KernelTotals, KernelTotalsSnapshot,
};
pub use pool::{Partition, ScopedPool, ScopedPoolConfig, ScopedPoolStats};
