//! AVX2 panel kernel.
//!
//! The accumulators are a `RA × RB` array of 256-bit registers. With the
//! default 3 × 4 blocking that is 12 YMM registers, leaving room for the
//! B loads and A broadcasts in the 16-register file.
//!
//! Floating-point lanes multiply then add (no FMA contraction) so that
//! every lane rounds exactly like the scalar `acc + a * b` loop.
//! Integer lanes use `mullo`/`add`, which wrap like `wrapping_mul`/`wrapping_add`.

#![allow(unsafe_op_in_unsafe_fn)]

use std::arch::x86_64::*;

/// One element type's view of a 256-bit register.
pub trait Avx2Lane: Copy {
    type Vec: Copy;

    /// Elements per register.
    const WIDTH: usize;

    unsafe fn zero() -> Self::Vec;
    unsafe fn load(ptr: *const Self) -> Self::Vec;
    unsafe fn splat(value: Self) -> Self::Vec;
    /// `acc + a * b`, lane-wise.
    unsafe fn mul_add(acc: Self::Vec, a: Self::Vec, b: Self::Vec) -> Self::Vec;
    unsafe fn store(ptr: *mut Self, v: Self::Vec);
}

impl Avx2Lane for f32 {
    type Vec = __m256;
    const WIDTH: usize = 8;

    #[inline(always)]
    unsafe fn zero() -> __m256 {
        _mm256_setzero_ps()
    }
    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> __m256 {
        _mm256_loadu_ps(ptr)
    }
    #[inline(always)]
    unsafe fn splat(value: f32) -> __m256 {
        _mm256_set1_ps(value)
    }
    #[inline(always)]
    unsafe fn mul_add(acc: __m256, a: __m256, b: __m256) -> __m256 {
        _mm256_add_ps(acc, _mm256_mul_ps(a, b))
    }
    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: __m256) {
        _mm256_storeu_ps(ptr, v)
    }
}

impl Avx2Lane for f64 {
    type Vec = __m256d;
    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> __m256d {
        _mm256_setzero_pd()
    }
    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> __m256d {
        _mm256_loadu_pd(ptr)
    }
    #[inline(always)]
    unsafe fn splat(value: f64) -> __m256d {
        _mm256_set1_pd(value)
    }
    #[inline(always)]
    unsafe fn mul_add(acc: __m256d, a: __m256d, b: __m256d) -> __m256d {
        _mm256_add_pd(acc, _mm256_mul_pd(a, b))
    }
    #[inline(always)]
    unsafe fn store(ptr: *mut f64, v: __m256d) {
        _mm256_storeu_pd(ptr, v)
    }
}

macro_rules! impl_int_lane {
    ($ty:ty) => {
        impl Avx2Lane for $ty {
            type Vec = __m256i;
            const WIDTH: usize = 8;

            #[inline(always)]
            unsafe fn zero() -> __m256i {
                _mm256_setzero_si256()
            }
            #[inline(always)]
            unsafe fn load(ptr: *const $ty) -> __m256i {
                _mm256_loadu_si256(ptr as *const __m256i)
            }
            #[inline(always)]
            unsafe fn splat(value: $ty) -> __m256i {
                _mm256_set1_epi32(value as i32)
            }
            #[inline(always)]
            unsafe fn mul_add(acc: __m256i, a: __m256i, b: __m256i) -> __m256i {
                _mm256_add_epi32(acc, _mm256_mullo_epi32(a, b))
            }
            #[inline(always)]
            unsafe fn store(ptr: *mut $ty, v: __m256i) {
                _mm256_storeu_si256(ptr as *mut __m256i, v)
            }
        }
    };
}

impl_int_lane!(i32);
impl_int_lane!(u32);

/// Computes an `RA × (RB * WIDTH)` panel: C = A × B (C is overwritten).
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 (checked by the `panel_*` dispatchers)
/// - `a` is readable for `RA` rows × `k` elements with stride `lda`
/// - `b` is readable for `k` rows × `RB * WIDTH` elements with stride `ldb`
/// - `c` is writable for `RA` rows × `RB * WIDTH` elements with stride `ldc`
#[target_feature(enable = "avx2")]
#[allow(clippy::too_many_arguments)]
#[allow(clippy::needless_range_loop)]
pub unsafe fn panel<T: Avx2Lane, const RA: usize, const RB: usize>(
    k: usize,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    c: *mut T,
    ldc: usize,
) {
    let mut csum = [[T::zero(); RB]; RA];

    for p in 0..k {
        let b_row = b.add(p * ldb);
        for bi in 0..RB {
            let bb = T::load(b_row.add(bi * T::WIDTH));
            for ai in 0..RA {
                let aa = T::splat(*a.add(ai * lda + p));
                csum[ai][bi] = T::mul_add(csum[ai][bi], aa, bb);
            }
        }
    }

    for ai in 0..RA {
        for bi in 0..RB {
            T::store(c.add(ai * ldc + bi * T::WIDTH), csum[ai][bi]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avx2_panel_3x4_f64() {
        if !is_x86_feature_detected!("avx2") {
            println!("Skipping - AVX2 not available");
            return;
        }

        let k = 16;
        let cols = 4 * 4;
        let a: Vec<f64> = (0..3 * k).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..k * cols).map(|i| (i % 10) as f64).collect();
        let mut c = vec![0.0; 3 * cols];

        unsafe {
            panel::<f64, 3, 4>(k, a.as_ptr(), k, b.as_ptr(), cols, c.as_mut_ptr(), cols);
        }

        let mut c_expected = vec![0.0; 3 * cols];
        for i in 0..3 {
            for j in 0..cols {
                for p in 0..k {
                    c_expected[i * cols + j] += a[i * k + p] * b[p * cols + j];
                }
            }
        }

        assert_eq!(c, c_expected);
    }

    #[test]
    fn test_avx2_panel_u32_wraps() {
        if !is_x86_feature_detected!("avx2") {
            println!("Skipping - AVX2 not available");
            return;
        }

        let k = 2;
        let a = vec![u32::MAX; 3 * k];
        let b = vec![2u32; k * 32];
        let mut c = vec![0u32; 3 * 32];

        unsafe {
            panel::<u32, 3, 4>(k, a.as_ptr(), k, b.as_ptr(), 32, c.as_mut_ptr(), 32);
        }

        let lane = 0u32
            .wrapping_add(u32::MAX.wrapping_mul(2))
            .wrapping_add(u32::MAX.wrapping_mul(2));
        assert!(c.iter().all(|&x| x == lane));
    }
}
