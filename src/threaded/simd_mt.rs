//! Multi-threaded register-blocked SIMD multiplication.

use std::marker::PhantomData;
use std::thread;

use tracing::debug;

use super::partition::partition_row_blocks;
use crate::blocked::simd::{compute_remainders, compute_row_blocks};
use crate::blocked::Tiling;
use crate::Element;

/// Raw pointer to C shared by workers that write disjoint regions of it.
struct SharedOut<'a, T> {
    ptr: *mut T,
    _borrow: PhantomData<&'a mut [T]>,
}

// SAFETY: workers only write regions they exclusively own (see
// `matmul_simd_mt`), and the borrow of C outlives the thread scope.
unsafe impl<T: Send> Send for SharedOut<'_, T> {}
unsafe impl<T: Send> Sync for SharedOut<'_, T> {}

impl<'a, T> SharedOut<'a, T> {
    fn new(c: &'a mut [T]) -> Self {
        Self {
            ptr: c.as_mut_ptr(),
            _borrow: PhantomData,
        }
    }

    fn ptr(&self) -> *mut T {
        self.ptr
    }
}

/// Multi-threaded SIMD multiplication: C = A × B.
///
/// Row blocks (groups of `RA` rows) are split across `threads` workers by
/// [`partition_row_blocks`]. Each worker runs the micro-kernel over its
/// own row blocks. Worker 0, after its blocks, also runs both scalar
/// remainder passes. Those regions lie outside every worker's blocked
/// region, so no element is written twice. All workers are joined before
/// returning. C is overwritten.
///
/// # Arguments
///
/// * `threads` - Worker count (the strategy uses `max(4, cpus)`)
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k, or if a thread can't be
/// spawned or panics.
pub fn matmul_simd_mt<T: Element>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    n: usize,
    k: usize,
    threads: usize,
) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    let tiling = Tiling::for_element::<T>(m, n, k);
    let parts = partition_row_blocks(tiling.row_blocks(), threads);
    debug!(
        threads = parts.len(),
        row_blocks = tiling.row_blocks(),
        col_blocks = tiling.col_blocks(),
        "partitioned row blocks"
    );

    let out = SharedOut::new(c);
    let (out, tiling) = (&out, &tiling);

    thread::scope(|s| {
        for (tid, blocks) in parts.into_iter().enumerate() {
            s.spawn(move || {
                // SAFETY: `blocks` ranges are disjoint across workers, and the
                // remainder regions (worker 0 only) don't intersect any
                // blocked panel. Shapes were checked above.
                unsafe {
                    compute_row_blocks(a, b, out.ptr(), tiling, blocks);
                    if tid == 0 {
                        compute_remainders(a, b, out.ptr(), tiling);
                    }
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::RA;
    use crate::matrix::naive::matmul_naive_ijk;

    fn check<T: Element>(m: usize, n: usize, k: usize, threads: usize) {
        let a: Vec<T> = (0..m * k).map(|i| T::from_u8((i % 10) as u8)).collect();
        let b: Vec<T> = (0..k * n).map(|i| T::from_u8((i % 11) as u8)).collect();

        let mut c_naive = vec![T::default(); m * n];
        let mut c_mt = vec![T::default(); m * n];
        matmul_naive_ijk(&a, &b, &mut c_naive, m, n, k);
        matmul_simd_mt(&a, &b, &mut c_mt, m, n, k, threads);

        assert_eq!(
            c_naive,
            c_mt,
            "{} {}x{}x{} threads={}",
            T::DATA_TYPE,
            m,
            n,
            k,
            threads
        );
    }

    #[test]
    fn test_simd_mt_matches_naive() {
        for size in [2, 4, 33, 64, 100, 128] {
            check::<i32>(size, size, size, 4);
            check::<u32>(size, size, size, 4);
            check::<f32>(size, size, size, 4);
            check::<f64>(size, size, size, 4);
        }
    }

    #[test]
    fn test_simd_mt_thread_counts() {
        // More workers than row blocks, a single worker, and an odd count.
        for threads in [1, 3, 7, 64] {
            check::<f32>(50, 70, 30, threads);
            check::<i32>(50, 70, 30, threads);
        }
    }

    #[test]
    fn test_worker_regions_are_disjoint() {
        for (m, n, threads) in [(2, 2, 4), (50, 70, 3), (128, 128, 8), (100, 33, 64)] {
            let tiling = Tiling::for_element::<f32>(m, n, 1);
            let mut owner = vec![None::<usize>; m * n];

            let mut claim = |tid: usize, i: usize, j: usize| {
                let slot = &mut owner[i * n + j];
                assert!(slot.is_none(), "({}, {}) written twice", i, j);
                *slot = Some(tid);
            };

            for (tid, blocks) in partition_row_blocks(tiling.row_blocks(), threads)
                .into_iter()
                .enumerate()
            {
                for (i, j) in tiling.panels(blocks) {
                    for ii in i..i + RA {
                        for jj in j..j + tiling.block_cols {
                            claim(tid, ii, jj);
                        }
                    }
                }
            }
            for (rows, cols) in [tiling.row_remainder(), tiling.column_remainder()] {
                for i in rows {
                    for j in cols.clone() {
                        claim(0, i, j);
                    }
                }
            }

            assert!(owner.iter().all(Option::is_some), "{}x{} not fully covered", m, n);
        }
    }
}
