//! Call-scoped worker pool.
//!
//! `ScopedPool` runs a parallel-for over a mutable output slice. Each worker
//! receives exclusive ownership of one contiguous chunk, so workers never
//! share a slot and no locking is needed while they run. All workers are
//! joined before `for_each_chunk_mut` returns.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use bridge_core::KernelError;
use log::{debug, error, info, trace};

use super::partition::Partition;

/// Statistics about one parallel-for run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScopedPoolStats {
    /// Number of workers that ran a chunk
    pub workers: usize,

    /// Elements per chunk
    pub chunk_len: usize,

    /// Whether the work ran on the calling thread
    pub inline: bool,

    /// Sum of worker execution times (microseconds)
    pub total_execution_time_us: u64,

    /// Slowest worker execution time (microseconds)
    pub max_execution_time_us: u64,
}

/// Configuration for the scoped pool
#[derive(Debug, Clone)]
pub struct ScopedPoolConfig {
    /// Maximum number of worker threads
    pub max_threads: usize,

    /// Smallest chunk worth handing to its own worker
    pub min_chunk_len: usize,

    /// Name prefix for worker threads
    pub thread_name_prefix: String,

    /// Whether to collect performance statistics
    pub collect_stats: bool,
}

impl Default for ScopedPoolConfig {
    fn default() -> Self {
        Self {
            max_threads: num_cpus::get(),
            min_chunk_len: 4096,
            thread_name_prefix: "rbridge-worker".to_string(),
            collect_stats: true,
        }
    }
}

/// A worker pool whose threads never outlive a single call
#[derive(Debug, Clone)]
pub struct ScopedPool {
    config: ScopedPoolConfig,
}

impl ScopedPool {
    /// Create a pool with `threads` workers and otherwise default settings
    pub fn new(threads: usize) -> Self {
        let config = ScopedPoolConfig {
            max_threads: threads,
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create a pool with the specified configuration
    pub fn with_config(config: ScopedPoolConfig) -> Self {
        Self { config }
    }

    /// Partition that a run over `len` elements would use
    pub fn plan(&self, len: usize) -> Partition {
        Partition::new(len, self.config.max_threads, self.config.min_chunk_len)
    }

    /// Run `f(offset, chunk)` over disjoint chunks of `out` in parallel.
    ///
    /// `offset` is the index of `chunk[0]` within `out`. Returns once every
    /// worker has finished. A thread name prefix containing NUL is reported
    /// as `KernelError::InvalidThreadName` before any worker starts. Thread
    /// spawn failure is reported as
    /// `KernelError::ResourceExhaustion`, a panicking worker as
    /// `KernelError::WorkerPanicked`; in both cases the remaining workers are
    /// still joined first.
    pub fn for_each_chunk_mut<T, F>(
        &self,
        out: &mut [T],
        f: F,
    ) -> Result<ScopedPoolStats, KernelError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if self.config.max_threads == 0 {
            return Err(KernelError::InvalidConcurrency);
        }

        let plan = self.plan(out.len());

        match plan.workers {
            0 => Ok(ScopedPoolStats::default()),
            1 => self.run_inline(out, &f),
            _ => self.run_parallel(plan, out, &f),
        }
    }

    /// A single chunk runs on the caller's thread.
    fn run_inline<T, F>(&self, out: &mut [T], f: &F) -> Result<ScopedPoolStats, KernelError>
    where
        F: Fn(usize, &mut [T]),
    {
        trace!("Running {} elements inline", out.len());

        let len = out.len();
        let start = Instant::now();
        panic::catch_unwind(AssertUnwindSafe(|| f(0, out))).map_err(|e| {
            error!("Inline worker panicked: {}", panic_message(e.as_ref()));
            KernelError::WorkerPanicked(0)
        })?;

        let mut stats = ScopedPoolStats {
            workers: 1,
            chunk_len: len,
            inline: true,
            ..Default::default()
        };
        if self.config.collect_stats {
            stats.record(start.elapsed());
        }
        Ok(stats)
    }

    fn run_parallel<T, F>(
        &self,
        plan: Partition,
        out: &mut [T],
        f: &F,
    ) -> Result<ScopedPoolStats, KernelError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        info!(
            "Dispatching {} elements to {} workers (chunk length {})",
            plan.len, plan.workers, plan.chunk_len
        );

        let names = (0..plan.workers)
            .map(|id| worker_name(&self.config.thread_name_prefix, id))
            .collect::<Result<Vec<_>, _>>()?;

        let collect_stats = self.config.collect_stats;
        let chunks: Vec<&mut [T]> = out.chunks_mut(plan.chunk_len).collect();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(plan.workers);
            let mut spawn_error = None;

            for (id, (chunk, thread_name)) in chunks.into_iter().zip(names).enumerate() {
                let offset = id * plan.chunk_len;

                let spawned = thread::Builder::new()
                    .name(thread_name)
                    .spawn_scoped(scope, move || {
                        debug!("Worker {}: Starting at offset {}", id, offset);
                        let exec_start = Instant::now();
                        f(offset, chunk);
                        let exec_time = exec_start.elapsed();
                        debug!(
                            "Worker {}: Finished in {:.2}ms",
                            id,
                            exec_time.as_micros() as f64 / 1000.0
                        );
                        exec_time
                    });

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        error!("Failed to spawn worker {}: {}", id, e);
                        spawn_error = Some(KernelError::ResourceExhaustion(format!(
                            "failed to spawn worker {} of {}: {}",
                            id, plan.workers, e
                        )));
                        break;
                    }
                }
            }

            let mut stats = ScopedPoolStats {
                workers: handles.len(),
                chunk_len: plan.chunk_len,
                ..Default::default()
            };
            let mut panicked = None;

            for (id, handle) in handles {
                match handle.join() {
                    Ok(exec_time) => {
                        if collect_stats {
                            stats.record(exec_time);
                        }
                    }
                    Err(e) => {
                        error!("Worker {}: Task panicked: {}", id, panic_message(e.as_ref()));
                        if panicked.is_none() {
                            panicked = Some(id);
                        }
                    }
                }
            }

            if let Some(e) = spawn_error {
                return Err(e);
            }
            if let Some(id) = panicked {
                return Err(KernelError::WorkerPanicked(id));
            }

            Ok(stats)
        })
    }
}

impl ScopedPoolStats {
    fn record(&mut self, exec_time: Duration) {
        let us = exec_time.as_micros() as u64;
        self.total_execution_time_us += us;
        self.max_execution_time_us = self.max_execution_time_us.max(us);
    }
}

/// Name of worker `id`. `std::thread::Builder` panics on names containing
/// NUL, so they are rejected here instead.
fn worker_name(prefix: &str, id: usize) -> Result<String, KernelError> {
    let name = format!("{}-{}", prefix, id);
    if name.contains('\0') {
        error!("Worker thread name prefix contains NUL: {:?}", prefix);
        return Err(KernelError::InvalidThreadName(name));
    }
    Ok(name)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<unknown panic>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn pool(threads: usize) -> ScopedPool {
        ScopedPool::with_config(ScopedPoolConfig {
            max_threads: threads,
            min_chunk_len: 1,
            thread_name_prefix: "test-worker".to_string(),
            collect_stats: true,
        })
    }

    #[test]
    fn test_every_slot_written_once() {
        let mut out = vec![0usize; 1001];

        let stats = pool(4)
            .for_each_chunk_mut(&mut out, |offset, chunk| {
                for (i, slot) in chunk.iter_mut().enumerate() {
                    *slot += offset + i + 1;
                }
            })
            .unwrap();

        assert_eq!(stats.workers, 4);
        assert!(!stats.inline);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(*v, i + 1);
        }
    }

    #[test]
    fn test_workers_are_named_threads() {
        let names = Mutex::new(HashSet::new());
        let mut out = vec![0u8; 8];

        pool(4)
            .for_each_chunk_mut(&mut out, |_, _| {
                let name = thread::current().name().unwrap_or_default().to_string();
                names.lock().unwrap().insert(name);
            })
            .unwrap();

        let names = names.into_inner().unwrap();
        assert_eq!(names.len(), 4);
        assert!(names.iter().all(|n| n.starts_with("test-worker-")));
    }

    #[test]
    fn test_empty_spawns_nothing() {
        let mut out: Vec<f64> = Vec::new();
        let stats = pool(4)
            .for_each_chunk_mut(&mut out, |_, _| panic!("must not run"))
            .unwrap();
        assert_eq!(stats, ScopedPoolStats::default());
    }

    #[test]
    fn test_single_chunk_runs_inline() {
        let caller = thread::current().id();
        let mut out = vec![0u8; 10];

        let stats = ScopedPool::new(8)
            .for_each_chunk_mut(&mut out, |_, chunk| {
                assert_eq!(thread::current().id(), caller);
                chunk.fill(1);
            })
            .unwrap();

        assert!(stats.inline);
        assert_eq!(stats.workers, 1);
        assert!(out.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let mut out = vec![0u32; 40];

        let result = pool(4).for_each_chunk_mut(&mut out, |offset, chunk| {
            if offset == 20 {
                panic!("worker failure");
            }
            chunk.fill(7);
        });

        assert_eq!(result, Err(KernelError::WorkerPanicked(2)));
        // Other workers still completed their chunks
        assert!(out[..20].iter().all(|&v| v == 7));
    }

    #[test]
    fn test_inline_panic_is_reported() {
        let mut out = vec![0u32; 4];
        let result = pool(1).for_each_chunk_mut(&mut out, |_, _| panic!("inline failure"));
        assert_eq!(result, Err(KernelError::WorkerPanicked(0)));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut out = vec![0u32; 4];
        let result = pool(0).for_each_chunk_mut(&mut out, |_, _| {});
        assert_eq!(result, Err(KernelError::InvalidConcurrency));
    }

    #[test]
    fn test_worker_name() {
        assert_eq!(worker_name("rbridge-worker", 3).unwrap(), "rbridge-worker-3");
        assert!(matches!(
            worker_name("w\0x", 0),
            Err(KernelError::InvalidThreadName(_))
        ));
    }

    #[test]
    fn test_nul_prefix_rejected_before_spawning() {
        let pool = ScopedPool::with_config(ScopedPoolConfig {
            max_threads: 2,
            min_chunk_len: 1,
            thread_name_prefix: "w\0x".to_string(),
            collect_stats: false,
        });
        let mut out = vec![0u8; 2];

        let result = pool.for_each_chunk_mut(&mut out, |_, chunk| chunk.fill(1));

        assert!(matches!(result, Err(KernelError::InvalidThreadName(_))));
        assert_eq!(out, vec![0, 0]);
    }
}
