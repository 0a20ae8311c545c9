//! Register-blocked SIMD multiplication.
//!
//! The output is tiled into `RA × (RB * W)` panels computed by the
//! micro-kernel in [`crate::kernels`]. Rows and columns that don't fill a
//! whole panel are finished by two scalar remainder passes, laid out in
//! [`tiling::Tiling`].

pub mod simd;
pub mod tiling;

pub use tiling::Tiling;
