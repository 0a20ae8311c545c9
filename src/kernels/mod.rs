//! Register-blocked SIMD micro-kernel.
//!
//! One call computes an `RA × (RB * W)` panel of C = A × B, where `W` is
//! the number of lanes in a 256-bit register for the element type. The
//! `RA * RB` accumulators stay in registers for the whole `k` loop: each
//! step loads `RB` vectors from a row of B, broadcasts `RA` scalars from
//! A and multiply-accumulates, so every load of B is reused `RA` times.
//!
//! Backends:
//! - `avx2`: 256-bit intrinsics, picked at runtime when the CPU has AVX2
//! - `portable`: plain lane arrays, same arithmetic, any target

#[cfg(target_arch = "x86_64")]
pub mod avx2;
pub mod portable;

/// Rows of A per panel (broadcast registers).
pub const RA: usize = 3;

/// Vector registers of B per panel.
pub const RB: usize = 4;

/// Columns covered by one panel for an element type with `lanes` lanes.
pub const fn block_cols(lanes: usize) -> usize {
    RB * lanes
}

/// True when the AVX2 panel kernels can run on this CPU.
#[inline]
pub fn has_avx2() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

macro_rules! panel_kernel {
    ($name:ident, $ty:ty, $lanes:literal) => {
        #[doc = concat!(
            "Computes a 3 × ", stringify!($lanes), "·4 panel of `", stringify!($ty), "`: C = A × B."
        )]
        ///
        /// Dispatches to AVX2 when available, otherwise to the portable kernel.
        ///
        /// # Safety
        ///
        /// See [`Element::dot_panel`](crate::Element::dot_panel).
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name(
            k: usize,
            a: *const $ty,
            lda: usize,
            b: *const $ty,
            ldb: usize,
            c: *mut $ty,
            ldc: usize,
        ) {
            #[cfg(target_arch = "x86_64")]
            {
                if has_avx2() {
                    unsafe { avx2::panel::<$ty, RA, RB>(k, a, lda, b, ldb, c, ldc) };
                    return;
                }
            }
            unsafe { portable::panel::<$ty, RA, RB, $lanes>(k, a, lda, b, ldb, c, ldc) };
        }
    };
}

panel_kernel!(panel_i32, i32, 8);
panel_kernel!(panel_u32, u32, 8);
panel_kernel!(panel_f32, f32, 8);
panel_kernel!(panel_f64, f64, 4);
