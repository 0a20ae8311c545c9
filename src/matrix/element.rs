//! Element types a [`Matrix`](super::Matrix) can hold.
//!
//! Every element type knows three things the strategies need: how to do
//! one multiply-accumulate step, how many lanes fit in a 256-bit vector,
//! and which register-blocked panel kernel to call.

use std::fmt;
use std::str::FromStr;

use rand::distributions::uniform::SampleUniform;

use crate::error::MatmulError;
use crate::kernels;

/// Element-type tag used by the selection surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int32,
    Uint32,
    Float,
    Double,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Int32,
        DataType::Uint32,
        DataType::Float,
        DataType::Double,
    ];

    pub fn is_floating_point(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int32 => "Int32",
            DataType::Uint32 => "Uint32",
            DataType::Float => "Float",
            DataType::Double => "Double",
        };
        f.write_str(name)
    }
}

impl FromStr for DataType {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int32" | "int" | "i32" => Ok(DataType::Int32),
            "uint32" | "uint" | "u32" => Ok(DataType::Uint32),
            "float" | "f32" => Ok(DataType::Float),
            "double" | "f64" => Ok(DataType::Double),
            _ => Err(MatmulError::UnsupportedDataType(s.to_string())),
        }
    }
}

/// Extra bound required to move elements through OpenCL buffers.
#[cfg(feature = "opencl")]
pub trait DevicePrm: ocl::OclPrm {}
#[cfg(feature = "opencl")]
impl<T: ocl::OclPrm> DevicePrm for T {}

/// Extra bound required to move elements through OpenCL buffers.
#[cfg(not(feature = "opencl"))]
pub trait DevicePrm {}
#[cfg(not(feature = "opencl"))]
impl<T> DevicePrm for T {}

/// A numeric type the engine can multiply.
pub trait Element:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + SampleUniform
    + DevicePrm
    + 'static
{
    /// Tag for this type.
    const DATA_TYPE: DataType;

    /// OpenCL C spelling, passed to the kernel as `-DT=<name>`.
    const CL_TYPE: &'static str;

    /// Lanes per 256-bit vector register.
    const LANES: usize;

    /// Widest `max - min` a uniform fill can sample without overflowing.
    const FILL_SPAN_MAX: f64;

    fn from_u8(value: u8) -> Self;

    /// `self + a * b`. Wraps on overflow for integers, unfused for floats.
    fn mul_acc(self, a: Self, b: Self) -> Self;

    fn to_f64(self) -> f64;

    /// Computes one `RA × (RB * LANES)` output panel.
    ///
    /// # Safety
    ///
    /// - `a` must be readable for `RA` rows of `k` elements with stride `lda`
    /// - `b` must be readable for `k` rows of `RB * LANES` elements with stride `ldb`
    /// - `c` must be writable for `RA` rows of `RB * LANES` elements with stride `ldc`
    /// - no other thread may touch the `c` panel during the call
    unsafe fn dot_panel(
        k: usize,
        a: *const Self,
        lda: usize,
        b: *const Self,
        ldb: usize,
        c: *mut Self,
        ldc: usize,
    );
}

macro_rules! impl_element {
    (
        $ty:ty, $tag:ident, $cl:literal, $lanes:literal, $span:expr, $panel:path,
        |$acc:ident, $a:ident, $b:ident| $step:expr
    ) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$tag;
            const CL_TYPE: &'static str = $cl;
            const LANES: usize = $lanes;
            const FILL_SPAN_MAX: f64 = $span;

            #[inline(always)]
            fn from_u8(value: u8) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn mul_acc(self, $a: Self, $b: Self) -> Self {
                let $acc = self;
                $step
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            unsafe fn dot_panel(
                k: usize,
                a: *const Self,
                lda: usize,
                b: *const Self,
                ldb: usize,
                c: *mut Self,
                ldc: usize,
            ) {
                unsafe { $panel(k, a, lda, b, ldb, c, ldc) }
            }
        }
    };
}

// Integer ranges sample with wrapping arithmetic. A float range is scaled by
// `1 - EPSILON` before sampling, which must stay finite.
impl_element!(i32, Int32, "int", 8, f64::INFINITY, kernels::panel_i32, |acc, a, b| acc
    .wrapping_add(a.wrapping_mul(b)));
impl_element!(u32, Uint32, "uint", 8, f64::INFINITY, kernels::panel_u32, |acc, a, b| acc
    .wrapping_add(a.wrapping_mul(b)));
impl_element!(
    f32,
    Float,
    "float",
    8,
    f32::MAX as f64 * (1.0 - f32::EPSILON as f64),
    kernels::panel_f32,
    |acc, a, b| acc + a * b
);
impl_element!(
    f64,
    Double,
    "double",
    4,
    f64::MAX * (1.0 - f64::EPSILON),
    kernels::panel_f64,
    |acc, a, b| acc + a * b
);
