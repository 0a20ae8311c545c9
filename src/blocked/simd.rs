//! Single-threaded SIMD strategy and the panel/remainder building blocks
//! shared with the multithreaded version.

use std::ops::Range;

use super::Tiling;
use crate::matrix::naive::dot_element;
use crate::Element;

/// SIMD matrix multiplication: C = A × B.
///
/// Runs the micro-kernel over every full panel, then the row remainder
/// (rows past the last full `RA` block, all columns) and finally the
/// column remainder (columns past the last full panel, blocked rows).
/// C is overwritten.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k.
pub fn matmul_simd<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, k: usize) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    let tiling = Tiling::for_element::<T>(m, n, k);
    let c_ptr = c.as_mut_ptr();

    // SAFETY: slice lengths checked above; this is the only writer.
    unsafe {
        compute_row_blocks(a, b, c_ptr, &tiling, 0..tiling.row_blocks());
        compute_remainders(a, b, c_ptr, &tiling);
    }
}

/// Runs the micro-kernel on every panel of the given row blocks.
///
/// # Safety
///
/// - `a`, `b` must match the tiling's m × k and k × n shapes
/// - `c` must point to an m × n buffer
/// - no other thread may write rows `row_blocks.start * RA .. row_blocks.end * RA`
///   within the blocked columns during the call
pub(crate) unsafe fn compute_row_blocks<T: Element>(
    a: &[T],
    b: &[T],
    c: *mut T,
    tiling: &Tiling,
    row_blocks: Range<usize>,
) {
    let (n, k) = (tiling.n, tiling.k);
    for (i, j) in tiling.panels(row_blocks) {
        unsafe {
            T::dot_panel(
                k,
                a.as_ptr().add(i * k),
                k,
                b.as_ptr().add(j),
                n,
                c.add(i * n + j),
                n,
            );
        }
    }
}

/// Scalar passes over the row remainder, then the column remainder.
///
/// # Safety
///
/// Same shape requirements as [`compute_row_blocks`]; no other thread
/// may write the remainder regions during the call.
pub(crate) unsafe fn compute_remainders<T: Element>(a: &[T], b: &[T], c: *mut T, tiling: &Tiling) {
    let (n, k) = (tiling.n, tiling.k);
    for (rows, cols) in [tiling.row_remainder(), tiling.column_remainder()] {
        for i in rows {
            for j in cols.clone() {
                unsafe { *c.add(i * n + j) = dot_element(a, b, i, j, n, k) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_naive_ijk;

    fn check<T: Element>(m: usize, n: usize, k: usize) {
        let a: Vec<T> = (0..m * k).map(|i| T::from_u8((i % 10) as u8)).collect();
        let b: Vec<T> = (0..k * n).map(|i| T::from_u8((i % 13) as u8)).collect();

        let mut c_naive = vec![T::default(); m * n];
        let mut c_simd = vec![T::default(); m * n];
        matmul_naive_ijk(&a, &b, &mut c_naive, m, n, k);
        matmul_simd(&a, &b, &mut c_simd, m, n, k);

        assert_eq!(c_naive, c_simd, "{} {}x{}x{}", T::DATA_TYPE, m, n, k);
    }

    #[test]
    fn test_simd_tile_boundaries() {
        for size in [2, 3, 4, 15, 16, 17, 31, 32, 33, 47, 48, 49] {
            check::<i32>(size, size, size);
            check::<u32>(size, size, size);
            check::<f32>(size, size, size);
            check::<f64>(size, size, size);
        }
    }

    #[test]
    fn test_simd_non_square() {
        for (m, n, k) in [(3, 64, 5), (64, 3, 5), (13, 17, 19), (100, 50, 75)] {
            check::<f32>(m, n, k);
            check::<i32>(m, n, k);
        }
    }

    #[test]
    fn test_simd_overwrites_output() {
        let a = vec![1.0f64; 9];
        let b = vec![1.0f64; 9];
        let mut c = vec![100.0; 9];
        matmul_simd(&a, &b, &mut c, 3, 3, 3);
        assert_eq!(c, vec![3.0; 9]);
    }
}
