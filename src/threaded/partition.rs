//! Balanced split of row blocks across worker threads.

use std::ops::Range;

/// Splits `num_row_blocks` blocks across `threads` workers.
///
/// Every worker gets `num_row_blocks / threads` blocks and the first
/// `num_row_blocks % threads` workers get one more, so no two workers
/// differ by more than one block. The ranges are contiguous, disjoint,
/// in thread order, and together cover `0..num_row_blocks`. Workers past
/// the available blocks get empty ranges.
///
/// # Example
///
/// ```
/// use matbench::threaded::partition::partition_row_blocks;
///
/// assert_eq!(partition_row_blocks(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
/// ```
pub fn partition_row_blocks(num_row_blocks: usize, threads: usize) -> Vec<Range<usize>> {
    let threads = threads.max(1);
    let base = num_row_blocks / threads;
    let extra = num_row_blocks % threads;

    let start = |tid: usize| tid * base + tid.min(extra);
    (0..threads).map(|tid| start(tid)..start(tid + 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even() {
        assert_eq!(partition_row_blocks(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_partition_remainder_goes_first() {
        assert_eq!(partition_row_blocks(42, 4), vec![0..11, 11..22, 22..32, 32..42]);
    }

    #[test]
    fn test_partition_more_threads_than_blocks() {
        let parts = partition_row_blocks(2, 5);
        assert_eq!(parts, vec![0..1, 1..2, 2..2, 2..2, 2..2]);
    }

    #[test]
    fn test_partition_properties() {
        for blocks in [0, 1, 7, 42, 341] {
            for threads in [1, 3, 4, 8, 16, 64] {
                let parts = partition_row_blocks(blocks, threads);
                assert_eq!(parts.len(), threads);
                assert_eq!(parts.first().unwrap().start, 0);
                assert_eq!(parts.last().unwrap().end, blocks);
                for pair in parts.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                let sizes: Vec<usize> = parts.iter().map(|r| r.len()).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "blocks={} threads={}", blocks, threads);
            }
        }
    }

    #[test]
    fn test_zero_threads_treated_as_one() {
        assert_eq!(partition_row_blocks(5, 0), vec![0..5]);
    }
}
