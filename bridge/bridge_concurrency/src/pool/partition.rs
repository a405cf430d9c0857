//! Index-range partitioning.

use std::ops::Range;

/// Split of `[0, len)` into contiguous, disjoint chunks.
///
/// Every chunk except possibly the last has exactly `chunk_len` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Total number of elements
    pub len: usize,

    /// Number of chunks (one worker each)
    pub workers: usize,

    /// Elements per chunk
    pub chunk_len: usize,
}

impl Partition {
    /// Plan a partition of `len` elements over at most `max_workers` workers,
    /// never making a chunk smaller than `min_chunk_len` unless `len` itself
    /// is smaller.
    pub fn new(len: usize, max_workers: usize, min_chunk_len: usize) -> Self {
        if len == 0 {
            return Self {
                len,
                workers: 0,
                chunk_len: 0,
            };
        }

        let by_size = len.div_ceil(min_chunk_len.max(1));
        let target = max_workers.max(1).min(by_size);
        let chunk_len = len.div_ceil(target);

        Self {
            len,
            workers: len.div_ceil(chunk_len),
            chunk_len,
        }
    }

    /// Index range handled by `worker`.
    pub fn range(&self, worker: usize) -> Range<usize> {
        let start = (worker * self.chunk_len).min(self.len);
        let end = (start + self.chunk_len).min(self.len);
        start..end
    }

    /// Iterate over every chunk's index range.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.workers).map(move |w| self.range(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let p = Partition::new(0, 8, 1);
        assert_eq!(p.workers, 0);
        assert_eq!(p.ranges().count(), 0);
    }

    #[test]
    fn test_even_split() {
        let p = Partition::new(100, 4, 1);
        assert_eq!(p.workers, 4);
        assert_eq!(p.chunk_len, 25);
        assert_eq!(p.range(3), 75..100);
    }

    #[test]
    fn test_uneven_split_covers_everything() {
        let p = Partition::new(10, 4, 1);
        assert_eq!(p.chunk_len, 3);
        assert_eq!(p.workers, 4);

        let ranges: Vec<_> = p.ranges().collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn test_more_workers_than_elements() {
        let p = Partition::new(3, 16, 1);
        assert_eq!(p.workers, 3);
        assert_eq!(p.chunk_len, 1);
    }

    #[test]
    fn test_min_chunk_caps_workers() {
        let p = Partition::new(10_000, 16, 4096);
        assert_eq!(p.workers, 3);

        let small = Partition::new(100, 16, 4096);
        assert_eq!(small.workers, 1);
        assert_eq!(small.range(0), 0..100);
    }

    #[test]
    fn test_chunks_are_disjoint_and_contiguous() {
        for len in [1usize, 7, 64, 1000, 1023] {
            for workers in 1..=9 {
                let p = Partition::new(len, workers, 1);
                let mut next = 0;
                for r in p.ranges() {
                    assert_eq!(r.start, next);
                    assert!(!r.is_empty());
                    next = r.end;
                }
                assert_eq!(next, len);
                assert!(p.workers <= workers);
            }
        }
    }
}
