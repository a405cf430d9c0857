//! Kernel statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for a single kernel call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelStats {
    /// Name of the element-wise operation
    pub op: &'static str,

    /// Number of elements computed
    pub elements: usize,

    /// Number of workers that ran
    pub workers: usize,

    /// Elements per worker chunk
    pub chunk_len: usize,

    /// Wall-clock time of the whole call (microseconds)
    pub elapsed_us: u64,

    /// Slowest worker execution time (microseconds)
    pub max_worker_time_us: u64,

    /// Sum of worker execution times (microseconds)
    pub total_worker_time_us: u64,
}

/// Cumulative counters across kernel calls.
///
/// Counters only grow and are updated with relaxed atomics; a snapshot taken
/// while calls are in flight may mix values from different calls.
#[derive(Debug, Default)]
pub struct KernelTotals {
    calls: AtomicU64,
    elements: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of `KernelTotals`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelTotalsSnapshot {
    /// Successful calls
    pub calls: u64,

    /// Elements computed by successful calls
    pub elements: u64,

    /// Calls that returned an error
    pub failures: u64,
}

impl KernelTotals {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call over `elements` elements
    pub fn record_success(&self, elements: usize) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.elements.fetch_add(elements as u64, Ordering::Relaxed);
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current counters
    pub fn snapshot(&self) -> KernelTotalsSnapshot {
        KernelTotalsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            elements: self.elements.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
