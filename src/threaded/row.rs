//! One thread per output row.

use std::thread;

use crate::matrix::naive::dot_element;
use crate::Element;

/// Multi-threaded multiplication that spawns exactly one thread per row of C.
///
/// Each thread owns one row of C and computes it against every column
/// of B. All threads are joined before returning. Simple, but it
/// oversubscribes the machine once `m` is larger than the core count.
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k, or if a thread can't be
/// spawned or panics.
pub fn matmul_thread_per_row<T: Element>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    n: usize,
    k: usize,
) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);
    if n == 0 {
        return;
    }

    thread::scope(|s| {
        for (i, row) in c.chunks_mut(n).enumerate() {
            s.spawn(move || {
                for (j, out) in row.iter_mut().enumerate() {
                    *out = dot_element(a, b, i, j, n, k);
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_naive_ijk;

    #[test]
    fn test_thread_per_row_matches_naive() {
        for (m, n, k) in [(2, 2, 2), (17, 5, 9), (64, 64, 64)] {
            let a: Vec<i32> = (0..m * k).map(|i| (i % 17) as i32 - 8).collect();
            let b: Vec<i32> = (0..k * n).map(|i| (i % 13) as i32).collect();

            let mut c_naive = vec![0; m * n];
            let mut c_mt = vec![0; m * n];
            matmul_naive_ijk(&a, &b, &mut c_naive, m, n, k);
            matmul_thread_per_row(&a, &b, &mut c_mt, m, n, k);

            assert_eq!(c_naive, c_mt, "{}x{}x{}", m, n, k);
        }
    }
}
