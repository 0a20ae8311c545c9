//! Engine configuration: where kernels live and how many threads to use.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the kernel source directory.
pub const KERNELS_DIR_ENV: &str = "MATBENCH_KERNELS_DIR";

/// Environment variable overriding the compiled-binary cache directory.
pub const KERNEL_BIN_DIR_ENV: &str = "MATBENCH_KERNEL_BIN_DIR";

/// Minimum thread count used by the multithreaded SIMD strategy.
pub const MIN_SIMD_THREADS: usize = 4;

/// Settings shared by every strategy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding OpenCL kernel sources (`mat_mult.cl`).
    pub kernels_dir: PathBuf,
    /// Directory holding compiled kernel binaries.
    pub binary_dir: PathBuf,
    /// Thread count for `MultithreadSimd`; `None` means `max(4, cpus)`.
    pub threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let kernels_dir = env::var_os(KERNELS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("kernels"));
        let binary_dir = env::var_os(KERNEL_BIN_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| kernels_dir.join("bin"));

        Self {
            kernels_dir,
            binary_dir,
            threads: None,
        }
    }
}

impl EngineConfig {
    pub fn with_kernels_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.kernels_dir = dir.into();
        self
    }

    pub fn with_binary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binary_dir = dir.into();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Thread count the multithreaded SIMD strategy will spawn.
    pub fn simd_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| num_cpus::get().max(MIN_SIMD_THREADS))
            .max(1)
    }
}
