//! Error types for the multiplication engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while selecting or running a multiplication.
#[derive(Debug, Error)]
pub enum MatmulError {
    /// An operand's storage does not match its declared shape.
    #[error("{operand}: expected {expected} elements, got {actual}")]
    DimensionMismatch {
        /// Which operand was wrong ("A", "B", "matrix").
        operand: &'static str,
        /// Rows × columns of the declared shape.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Square order not in the supported set.
    #[error("Unsupported matrix order: {0}")]
    UnsupportedOrder(usize),

    /// Element type tag not recognised.
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// Strategy tag not recognised.
    #[error("Unsupported multiplication strategy: {0}")]
    UnsupportedStrategy(String),

    /// GPU strategy requested from a build without the `opencl` feature.
    #[error("GPU offload requires the `opencl` feature")]
    GpuUnavailable,

    /// No compatible compute device found.
    #[error("No compatible compute device: {0}")]
    NoDevice(String),

    /// Kernel source failed to compile.
    #[error("Kernel build failed (options `{options}`):\n{log}")]
    Build {
        /// Preprocessor/compiler options passed to the build.
        options: String,
        /// Compiler diagnostic as reported by the driver.
        log: String,
    },

    /// A device call failed.
    #[error("{operation} FAILED: {message}")]
    Device {
        /// Name of the failing device operation.
        operation: &'static str,
        /// Driver status and message.
        message: String,
    },

    /// A device program operation was called in the wrong lifecycle state.
    #[error("{operation} called in state {state}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the program was in.
        state: String,
    },

    /// Kernel source or binary cache file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, MatmulError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = MatmulError::DimensionMismatch {
            operand: "B",
            expected: 12,
            actual: 9,
        };
        assert_eq!(err.to_string(), "B: expected 12 elements, got 9");
    }

    #[test]
    fn test_device_error_names_operation() {
        let err = MatmulError::Device {
            operation: "clCreateBuffer",
            message: "CL_INVALID_BUFFER_SIZE".to_string(),
        };
        assert_eq!(err.to_string(), "clCreateBuffer FAILED: CL_INVALID_BUFFER_SIZE");
    }

    #[test]
    fn test_build_error_keeps_log() {
        let err = MatmulError::Build {
            options: "-DT=float".to_string(),
            log: "error: use of undeclared identifier 'x'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("-DT=float"));
        assert!(msg.contains("undeclared identifier"));
    }
}
