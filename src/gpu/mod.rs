//! OpenCL offload of the naive product.
//!
//! Compiled only with the `opencl` feature. The kernel source lives in
//! `EngineConfig::kernels_dir` and is parameterized by element type through
//! `-DT=<type>`, so each element type gets its own compiled binary.

pub mod dispatch;
pub mod program;

pub use dispatch::{dispatch, multiply_naive_ocl, prepare_gpu_binary};
pub use program::{Program, ProgramState};

use std::fmt::Display;

use crate::error::MatmulError;
use crate::Element;

/// Kernel source file under the kernels directory.
pub const KERNEL_FILE: &str = "mat_mult.cl";

/// Entry point of the naive kernel.
pub const KERNEL_NAME: &str = "naive_mat_mult";

/// Compiler options selecting the element type, e.g. `-DT=float`.
pub fn build_options<T: Element>() -> String {
    format!("-DT={}", T::CL_TYPE)
}

/// Maps a driver error to [`MatmulError::Device`] for `operation`.
pub(crate) fn device_error<E: Display>(operation: &'static str) -> impl FnOnce(E) -> MatmulError {
    move |err| MatmulError::Device {
        operation,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options() {
        assert_eq!(build_options::<f32>(), "-DT=float");
        assert_eq!(build_options::<u32>(), "-DT=uint");
        assert_eq!(build_options::<f64>(), "-DT=double");
    }

    #[test]
    fn test_device_error_keeps_operation() {
        let err = device_error("clCreateBuffer")("CL_OUT_OF_RESOURCES");
        assert_eq!(err.to_string(), "clCreateBuffer FAILED: CL_OUT_OF_RESOURCES");
    }
}
