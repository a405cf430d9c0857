//! Parallel element-wise kernel.
//!
//! Computes `out[i] = op(lhs[i], rhs[i])` for every index, splitting the index
//! range across a call-scoped worker pool. Output slot `i` depends only on
//! input slot `i`, so the result is bit-identical for any worker count.

use std::time::Instant;

use bridge_core::{KernelConfig, KernelError, NumericVector};
use log::{debug, warn};

use super::stats::{KernelStats, KernelTotals, KernelTotalsSnapshot};
use crate::pool::{ScopedPool, ScopedPoolConfig};

/// A binary operation applied independently at every index.
pub trait ElementwiseOp: Send + Sync {
    /// Short name used in logs and statistics
    fn name(&self) -> &'static str;

    /// Combine one pair of elements
    fn apply(&self, lhs: f64, rhs: f64) -> f64;
}

/// IEEE-754 division. A zero denominator yields `±inf` or `NaN`, not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

impl ElementwiseOp for Divide {
    fn name(&self) -> &'static str {
        "divide"
    }

    #[inline]
    fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        lhs / rhs
    }
}

/// Per-kernel execution options
#[derive(Debug, Clone)]
pub struct KernelOptions {
    /// Number of workers; defaults to the logical core count
    pub concurrency: usize,

    /// Smallest chunk worth handing to its own worker
    pub min_chunk_len: usize,

    /// Name prefix for worker threads
    pub thread_name_prefix: String,

    /// Whether to time workers
    pub collect_stats: bool,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self::from_config(&KernelConfig::default())
    }
}

impl KernelOptions {
    /// Build options from the kernel configuration section
    pub fn from_config(config: &KernelConfig) -> Self {
        Self {
            concurrency: config.effective_concurrency(),
            min_chunk_len: config.min_chunk_len,
            thread_name_prefix: config.thread_name_prefix.clone(),
            collect_stats: config.collect_stats,
        }
    }

    /// Override the worker count
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Override the minimum chunk length
    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    fn pool_config(&self) -> ScopedPoolConfig {
        ScopedPoolConfig {
            max_threads: self.concurrency,
            min_chunk_len: self.min_chunk_len.max(1),
            thread_name_prefix: self.thread_name_prefix.clone(),
            collect_stats: self.collect_stats,
        }
    }
}

/// Element-wise kernel over an operation `O`
#[derive(Debug, Default)]
pub struct ElementwiseKernel<O = Divide> {
    op: O,
    options: KernelOptions,
    totals: KernelTotals,
}

impl ElementwiseKernel<Divide> {
    /// Division kernel with the given options
    pub fn divide(options: KernelOptions) -> Self {
        Self::new(Divide, options)
    }
}

impl<O: ElementwiseOp> ElementwiseKernel<O> {
    /// Create a kernel for `op`
    pub fn new(op: O, options: KernelOptions) -> Self {
        Self {
            op,
            options,
            totals: KernelTotals::new(),
        }
    }

    /// Execution options
    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    /// Cumulative counters for this kernel
    pub fn totals(&self) -> KernelTotalsSnapshot {
        self.totals.snapshot()
    }

    /// Compute into a freshly allocated vector
    pub fn apply(&self, lhs: &[f64], rhs: &[f64]) -> Result<NumericVector, KernelError> {
        self.apply_with_stats(lhs, rhs).map(|(out, _)| out)
    }

    /// Compute into a freshly allocated vector and report statistics
    pub fn apply_with_stats(
        &self,
        lhs: &[f64],
        rhs: &[f64],
    ) -> Result<(NumericVector, KernelStats), KernelError> {
        let result = check_dimensions(lhs, rhs)
            .and_then(|_| NumericVector::zeroed(lhs.len()))
            .and_then(|mut out| {
                let stats = self.run(lhs, rhs, out.as_mut_slice())?;
                Ok((out, stats))
            });

        self.record(&result.as_ref().map(|(out, _)| out.len()));
        result
    }

    /// Compute into a caller-supplied buffer of the same length as the inputs
    pub fn apply_into(
        &self,
        lhs: &[f64],
        rhs: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStats, KernelError> {
        let result = check_dimensions(lhs, rhs).and_then(|_| {
            if out.len() != lhs.len() {
                return Err(KernelError::OutputLengthMismatch {
                    expected: lhs.len(),
                    actual: out.len(),
                });
            }
            self.run(lhs, rhs, out)
        });

        self.record(&result.as_ref().map(|stats| stats.elements));
        result
    }

    fn run(&self, lhs: &[f64], rhs: &[f64], out: &mut [f64]) -> Result<KernelStats, KernelError> {
        if self.options.concurrency == 0 {
            return Err(KernelError::InvalidConcurrency);
        }

        let start = Instant::now();
        let op = &self.op;
        let pool = ScopedPool::with_config(self.options.pool_config());

        let pool_stats = pool.for_each_chunk_mut(out, |offset, chunk| {
            let end = offset + chunk.len();
            let lhs = &lhs[offset..end];
            let rhs = &rhs[offset..end];

            for ((slot, &a), &b) in chunk.iter_mut().zip(lhs).zip(rhs) {
                *slot = op.apply(a, b);
            }
        })?;

        let stats = KernelStats {
            op: op.name(),
            elements: out.len(),
            workers: pool_stats.workers,
            chunk_len: pool_stats.chunk_len,
            elapsed_us: start.elapsed().as_micros() as u64,
            max_worker_time_us: pool_stats.max_execution_time_us,
            total_worker_time_us: pool_stats.total_execution_time_us,
        };

        debug!(
            "{} over {} elements on {} workers in {}us",
            stats.op, stats.elements, stats.workers, stats.elapsed_us
        );

        Ok(stats)
    }

    fn record(&self, result: &Result<usize, &KernelError>) {
        match result {
            Ok(elements) => self.totals.record_success(*elements),
            Err(e) => {
                warn!("{} kernel failed: {}", self.op.name(), e);
                self.totals.record_failure();
            }
        }
    }
}

fn check_dimensions(lhs: &[f64], rhs: &[f64]) -> Result<(), KernelError> {
    if lhs.len() != rhs.len() {
        return Err(KernelError::DimensionMismatch {
            numerator: lhs.len(),
            denominator: rhs.len(),
        });
    }
    Ok(())
}

/// Element-wise quotient `numerator[i] / denominator[i]` using every logical core.
pub fn parad(numerator: &[f64], denominator: &[f64]) -> Result<NumericVector, KernelError> {
    parad_with(&KernelOptions::default(), numerator, denominator)
}

/// Element-wise quotient with explicit options.
pub fn parad_with(
    options: &KernelOptions,
    numerator: &[f64],
    denominator: &[f64],
) -> Result<NumericVector, KernelError> {
    ElementwiseKernel::divide(options.clone()).apply(numerator, denominator)
}
