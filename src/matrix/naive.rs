//! Scalar reference loops.
//!
//! These are the correctness baselines every other strategy is compared
//! against, and the fallback used by the SIMD remainder passes.

use super::Element;

/// Naive matrix multiplication using i-j-k loop order.
///
/// This is the textbook triple-loop implementation. The innermost loop
/// accesses B with stride `n` (column-wise), so it's slow on anything
/// that doesn't fit in cache.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, accumulated into (C += A * B)
/// * `m` - Rows of A and C
/// * `n` - Columns of B and C
/// * `k` - Columns of A, rows of B
pub fn matmul_naive_ijk<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, k: usize) {
    for i in 0..m {
        for j in 0..n {
            for p in 0..k {
                c[i * n + j] = c[i * n + j].mul_acc(a[i * k + p], b[p * n + j]);
            }
        }
    }
}

/// Single output element `C[i, j]` of A (m × k) times B (k × n).
///
/// Accumulates in ascending `p`, the same order as [`matmul_naive_ijk`]
/// and the SIMD kernels, so all strategies agree bit-for-bit.
#[inline]
pub fn dot_element<T: Element>(a: &[T], b: &[T], i: usize, j: usize, n: usize, k: usize) -> T {
    let row = &a[i * k..i * k + k];
    let mut acc = T::default();
    for (p, &a_ip) in row.iter().enumerate() {
        acc = acc.mul_acc(a_ip, b[p * n + j]);
    }
    acc
}
