//! Lane-array panel kernel for CPUs without AVX2.
//!
//! Mirrors the AVX2 kernel operation for operation, with `[T; W]` arrays
//! standing in for vector registers, so results match it exactly.

use crate::Element;

/// Computes an `RA × (RB * W)` panel: C = A × B.
///
/// # Safety
///
/// See [`Element::dot_panel`].
#[allow(clippy::too_many_arguments)]
#[allow(clippy::needless_range_loop)]
pub unsafe fn panel<T: Element, const RA: usize, const RB: usize, const W: usize>(
    k: usize,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    c: *mut T,
    ldc: usize,
) {
    let mut acc = [[[T::default(); W]; RB]; RA];

    for p in 0..k {
        for bi in 0..RB {
            let mut bb = [T::default(); W];
            for lane in 0..W {
                bb[lane] = unsafe { *b.add(p * ldb + bi * W + lane) };
            }
            for ai in 0..RA {
                let aa = unsafe { *a.add(ai * lda + p) };
                for lane in 0..W {
                    acc[ai][bi][lane] = acc[ai][bi][lane].mul_acc(aa, bb[lane]);
                }
            }
        }
    }

    for ai in 0..RA {
        for bi in 0..RB {
            for lane in 0..W {
                unsafe { *c.add(ai * ldc + bi * W + lane) = acc[ai][bi][lane] };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::naive::matmul_naive_ijk;

    #[test]
    fn test_portable_panel_matches_naive() {
        let k = 9;
        let a: Vec<i32> = (0..2 * k).map(|i| i as i32 - 5).collect();
        let b: Vec<i32> = (0..k * 6).map(|i| (i % 4) as i32).collect();
        let mut c = vec![0; 2 * 6];

        unsafe { panel::<i32, 2, 3, 2>(k, a.as_ptr(), k, b.as_ptr(), 6, c.as_mut_ptr(), 6) };

        let mut expected = vec![0; 2 * 6];
        matmul_naive_ijk(&a, &b, &mut expected, 2, 6, k);
        assert_eq!(c, expected);
    }
}
