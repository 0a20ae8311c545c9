//! Dense matrix multiplication, benchmarked across strategies.
//!
//! The same product computed six ways: a scalar i-j-k loop, a
//! register-blocked SIMD kernel, thread-per-row, thread-per-element, the
//! SIMD kernel split across threads, and a naive OpenCL kernel. I wanted to
//! see where each one stops scaling. All CPU strategies produce identical
//! results for identical inputs; the GPU agrees up to float summation order.
//!
//! ## Usage
//!
//! ```
//! use matbench::{Matrix, MultType};
//!
//! let mut a = Matrix::<f32, 128, 128>::new();
//! let mut b = Matrix::<f32, 128, 128>::new();
//! a.random_fill(0.0, 100.0, 1);
//! b.random_fill(0.0, 100.0, 2);
//!
//! let naive = a.mult(&b, MultType::Naive).unwrap();
//! let simd = a.mult(&b, MultType::MultithreadSimd).unwrap();
//! assert!(naive.max_abs_diff(&simd) < 1e-3);
//! ```
//!
//! Benchmarks pick strategy, element type and order at runtime through
//! [`select::dispatch`].
//!
//! ## What's inside
//!
//! - Generic 3×4 register-blocked AVX2 kernel (portable fallback without AVX2)
//! - i32, u32, f32 and f64 elements; integer products wrap on overflow
//! - Scoped-thread strategies with non-overlapping output regions
//! - OpenCL program lifecycle with binary caching (`opencl` feature)

pub mod blocked;
pub mod config;
pub mod error;
#[cfg(feature = "opencl")]
pub mod gpu;
pub mod kernels;
pub mod matrix;
pub mod report;
pub mod select;
pub mod strategy;
pub mod threaded;

pub use config::EngineConfig;
pub use error::{MatmulError, Result};
pub use matrix::Matrix;
pub use matrix::element::{DataType, Element};
pub use report::BenchmarkReport;
pub use select::{OrderVisitor, SUPPORTED_ORDERS, Selection, dispatch};
pub use strategy::{MultType, multiply_slices};

#[cfg(feature = "opencl")]
pub use gpu::{Program, ProgramState, prepare_gpu_binary};
