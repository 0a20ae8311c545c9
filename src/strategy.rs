//! Strategy tags and the single dispatch point every multiplication goes through.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::blocked::simd::matmul_simd;
use crate::config::EngineConfig;
use crate::error::{MatmulError, Result};
use crate::matrix::naive::matmul_naive_ijk;
use crate::threaded::{matmul_simd_mt, matmul_thread_per_element, matmul_thread_per_row};
use crate::Element;

/// Which algorithm computes the product.
///
/// The choice never changes the mathematical result: CPU strategies agree
/// exactly, the GPU agrees up to floating-point summation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultType {
    /// Scalar i-j-k triple loop.
    Naive,
    /// Register-blocked SIMD kernel plus scalar remainder passes.
    Simd,
    /// One thread per output row.
    MultithreadRow,
    /// One thread per output element.
    MultithreadElement,
    /// SIMD kernel with row blocks split across `max(4, cpus)` threads.
    MultithreadSimd,
    /// Naive OpenCL kernel (needs the `opencl` feature).
    Gpu,
}

impl MultType {
    pub const ALL: [MultType; 6] = [
        MultType::Naive,
        MultType::Simd,
        MultType::MultithreadRow,
        MultType::MultithreadElement,
        MultType::MultithreadSimd,
        MultType::Gpu,
    ];

    /// Strategies that run on the host CPU.
    pub const CPU: [MultType; 5] = [
        MultType::Naive,
        MultType::Simd,
        MultType::MultithreadRow,
        MultType::MultithreadElement,
        MultType::MultithreadSimd,
    ];
}

impl fmt::Display for MultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MultType::Naive => "Naive",
            MultType::Simd => "Simd",
            MultType::MultithreadRow => "MultithreadRow",
            MultType::MultithreadElement => "MultithreadElement",
            MultType::MultithreadSimd => "MultithreadSimd",
            MultType::Gpu => "NaiveOcl",
        };
        f.write_str(name)
    }
}

impl FromStr for MultType {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(MultType::Naive),
            "simd" => Ok(MultType::Simd),
            "multithreadrow" => Ok(MultType::MultithreadRow),
            "multithreadelement" => Ok(MultType::MultithreadElement),
            "multithreadsimd" => Ok(MultType::MultithreadSimd),
            "naiveocl" | "gpu" => Ok(MultType::Gpu),
            _ => Err(MatmulError::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// Multiplies A (m × k) by B (k × n) into a newly allocated m × n result.
///
/// This is the dynamic entry point behind [`Matrix::mult`](crate::Matrix::mult).
/// Shapes are checked before any work starts.
///
/// # Errors
///
/// - [`MatmulError::DimensionMismatch`] if a slice doesn't match its shape
/// - [`MatmulError::GpuUnavailable`] for [`MultType::Gpu`] without the `opencl` feature
/// - any device error from the GPU pathway
///
/// # Example
///
/// ```
/// use matbench::{multiply_slices, EngineConfig, MultType};
///
/// let a = vec![1, 2, 3, 4, 5, 6]; // 2x3
/// let b = vec![7, 8, 9, 10, 11, 12]; // 3x2
/// let c = multiply_slices(MultType::Simd, &a, &b, 2, 2, 3, &EngineConfig::default()).unwrap();
/// assert_eq!(c, vec![58, 64, 139, 154]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn multiply_slices<T: Element>(
    mult: MultType,
    a: &[T],
    b: &[T],
    m: usize,
    n: usize,
    k: usize,
    config: &EngineConfig,
) -> Result<Vec<T>> {
    check_len("A", a.len(), m * k)?;
    check_len("B", b.len(), k * n)?;
    debug!(strategy = %mult, dtype = %T::DATA_TYPE, m, n, k, "multiplying");

    let mut c = vec![T::default(); m * n];
    match mult {
        MultType::Naive => matmul_naive_ijk(a, b, &mut c, m, n, k),
        MultType::Simd => matmul_simd(a, b, &mut c, m, n, k),
        MultType::MultithreadRow => matmul_thread_per_row(a, b, &mut c, m, n, k),
        MultType::MultithreadElement => matmul_thread_per_element(a, b, &mut c, m, n, k),
        MultType::MultithreadSimd => {
            matmul_simd_mt(a, b, &mut c, m, n, k, config.simd_threads())
        }
        MultType::Gpu => return multiply_gpu(a, b, m, n, k, config),
    }
    Ok(c)
}

fn check_len(operand: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(MatmulError::DimensionMismatch {
            operand,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(feature = "opencl")]
fn multiply_gpu<T: Element>(
    a: &[T],
    b: &[T],
    m: usize,
    n: usize,
    k: usize,
    config: &EngineConfig,
) -> Result<Vec<T>> {
    crate::gpu::multiply_naive_ocl(a, b, m, n, k, config)
}

#[cfg(not(feature = "opencl"))]
fn multiply_gpu<T: Element>(
    _a: &[T],
    _b: &[T],
    _m: usize,
    _n: usize,
    _k: usize,
    _config: &EngineConfig,
) -> Result<Vec<T>> {
    Err(MatmulError::GpuUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_case_insensitive() {
        assert_eq!("NAIVE".parse::<MultType>().unwrap(), MultType::Naive);
        assert_eq!(
            "MultithreadSimd".parse::<MultType>().unwrap(),
            MultType::MultithreadSimd
        );
        assert_eq!("naiveocl".parse::<MultType>().unwrap(), MultType::Gpu);
        assert!(matches!(
            "strassen".parse::<MultType>(),
            Err(MatmulError::UnsupportedStrategy(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for mult in MultType::ALL {
            assert_eq!(mult.to_string().parse::<MultType>().unwrap(), mult);
        }
    }

    #[test]
    fn test_dimension_mismatch_fails_before_work() {
        let a = vec![1.0f32; 6];
        let b = vec![1.0f32; 6];
        let err = multiply_slices(MultType::Naive, &a, &b, 2, 2, 4, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MatmulError::DimensionMismatch {
                operand: "A",
                expected: 8,
                actual: 6
            }
        ));
    }

    #[test]
    fn test_cpu_strategies_agree() {
        let (m, n, k) = (37, 41, 29);
        let a: Vec<u32> = (0..m * k).map(|i| (i * 7 % 101) as u32).collect();
        let b: Vec<u32> = (0..k * n).map(|i| (i * 3 % 97) as u32).collect();
        let cfg = EngineConfig::default();

        let reference = multiply_slices(MultType::Naive, &a, &b, m, n, k, &cfg).unwrap();
        for mult in MultType::CPU {
            let c = multiply_slices(mult, &a, &b, m, n, k, &cfg).unwrap();
            assert_eq!(c, reference, "{}", mult);
        }
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn test_gpu_without_feature_fails_loudly() {
        let a = vec![1i32; 4];
        let err = multiply_slices(MultType::Gpu, &a, &a, 2, 2, 2, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MatmulError::GpuUnavailable));
    }
}
