//! Device program lifecycle.
//!
//! ```text
//! Uninitialized --initialize--> ContextReady --build / load_from_binary--> Built
//!       ^                                                                    |
//!       |                                                       create_queue_and_kernel
//!     reset                                                                  v
//!       +------------------- Dispatched <----------dispatch------------- Queued
//! ```
//!
//! Every device handle (context, program, queue, kernel) is an owning
//! `ocl` value that releases its `cl_*` object when dropped, so handles
//! are released on every exit path, including early `?` returns. They are
//! torn down kernel first, context last, by [`Program::reset`] and on drop.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ocl::core::Kernel as KernelCore;
use ocl::enums::{ProgramInfo, ProgramInfoResult};
use ocl::{Context, Device, Platform, Program as ClProgram, Queue};
use tracing::{debug, info};

use super::device_error;
use crate::config::EngineConfig;
use crate::error::{MatmulError, Result};

/// Where a [`Program`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    ContextReady,
    Built,
    Queued,
    Dispatched,
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A kernel file compiled for one device context.
///
/// At most one context is live per `Program`. Call [`Program::reset`]
/// before initializing again.
pub struct Program {
    kernel_file: PathBuf,
    kernels_dir: PathBuf,
    binary_dir: PathBuf,
    binary_tag: Option<String>,
    state: ProgramState,
    kernel_name: Option<String>,
    kernel: Option<KernelCore>,
    queue: Option<Queue>,
    program: Option<ClProgram>,
    context: Option<Context>,
    device: Option<Device>,
}

impl Program {
    /// A program for `kernel_file`, resolved under `config.kernels_dir`.
    pub fn new(kernel_file: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self {
            kernel_file: kernel_file.into(),
            kernels_dir: config.kernels_dir.clone(),
            binary_dir: config.binary_dir.clone(),
            binary_tag: None,
            state: ProgramState::Uninitialized,
            kernel_name: None,
            kernel: None,
            queue: None,
            program: None,
            context: None,
            device: None,
        }
    }

    /// Suffix for the cached binary name (`mat_mult-float.bin`).
    ///
    /// Binaries built with different `-D` options must not share a cache file.
    pub fn with_binary_tag(mut self, tag: impl Into<String>) -> Self {
        self.binary_tag = Some(tag.into());
        self
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn source_path(&self) -> PathBuf {
        self.kernels_dir.join(&self.kernel_file)
    }

    /// Cache file: the kernel file name with its extension replaced by `.bin`.
    pub fn binary_path(&self) -> PathBuf {
        let stem = self
            .kernel_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match &self.binary_tag {
            Some(tag) => format!("{}-{}.bin", stem, tag),
            None => format!("{}.bin", stem),
        };
        self.binary_dir.join(name)
    }

    /// Acquires the first platform's first device and creates a context.
    ///
    /// # Errors
    ///
    /// [`MatmulError::NoDevice`] when no platform or device is present.
    pub fn initialize(&mut self) -> Result<()> {
        self.expect_state("initialize", &[ProgramState::Uninitialized])?;

        let platform = Platform::list()
            .into_iter()
            .next()
            .ok_or_else(|| MatmulError::NoDevice("no OpenCL platform found".to_string()))?;
        let device = Device::first(platform).map_err(|e| MatmulError::NoDevice(e.to_string()))?;
        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(device_error("clCreateContext"))?;

        debug!(device = %device.name().unwrap_or_default(), "created OpenCL context");
        self.device = Some(device);
        self.context = Some(context);
        self.state = ProgramState::ContextReady;
        Ok(())
    }

    /// Compiles the kernel source with `options` (e.g. `-DT=float`).
    ///
    /// # Errors
    ///
    /// [`MatmulError::Build`] carrying the compiler log when compilation fails.
    pub fn build(&mut self, options: &str) -> Result<()> {
        self.expect_state("build", &[ProgramState::ContextReady])?;
        let (device, context) = self.device_and_context("build")?;

        let path = self.source_path();
        let source = fs::read_to_string(&path).map_err(|source| MatmulError::Io {
            path: path.clone(),
            source,
        })?;

        let program = ClProgram::builder()
            .devices(device)
            .src(source)
            .cmplr_opt(options)
            .build(context)
            .map_err(|e| MatmulError::Build {
                options: options.to_string(),
                log: e.to_string(),
            })?;

        debug!(kernel = %path.display(), options, "built program from source");
        self.program = Some(program);
        self.state = ProgramState::Built;
        Ok(())
    }

    /// Writes the compiled binary to [`Program::binary_path`].
    ///
    /// A cached binary is not checked against the source: if the source
    /// changes, rebuild and save again.
    pub fn save_binary(&self) -> Result<PathBuf> {
        let program = self.program.as_ref().ok_or_else(|| self.invalid("save_binary"))?;

        let info = program
            .info(ProgramInfo::Binaries)
            .map_err(device_error("clGetProgramInfo"))?;
        let binary = match info {
            ProgramInfoResult::Binaries(mut bins) if !bins.is_empty() => bins.swap_remove(0),
            other => {
                return Err(MatmulError::Device {
                    operation: "clGetProgramInfo",
                    message: format!("no program binary available: {:?}", other),
                });
            }
        };

        let path = self.binary_path();
        fs::create_dir_all(&self.binary_dir).map_err(|source| MatmulError::Io {
            path: self.binary_dir.clone(),
            source,
        })?;
        fs::write(&path, &binary).map_err(|source| MatmulError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), bytes = binary.len(), "saved program binary");
        Ok(path)
    }

    /// Loads the cached binary from [`Program::binary_path`].
    pub fn load_from_binary(&mut self) -> Result<()> {
        let path = self.binary_path();
        self.load_from_binary_path(&path)
    }

    /// Loads a previously saved program binary from `path`.
    pub fn load_from_binary_path(&mut self, path: &Path) -> Result<()> {
        self.expect_state("load_from_binary", &[ProgramState::ContextReady])?;
        let (device, context) = self.device_and_context("load_from_binary")?;

        let binary = fs::read(path).map_err(|source| MatmulError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let binaries = [binary.as_slice()];

        let program = ClProgram::builder()
            .devices(device)
            .binaries(&binaries)
            .build(context)
            .map_err(device_error("clCreateProgramWithBinary"))?;

        info!(path = %path.display(), "loaded program binary");
        self.program = Some(program);
        self.state = ProgramState::Built;
        Ok(())
    }

    /// Creates the command queue and resolves the `name` entry point.
    pub fn create_queue_and_kernel(&mut self, name: &str) -> Result<()> {
        self.expect_state("create_queue_and_kernel", &[ProgramState::Built])?;
        let (device, context) = self.device_and_context("create_queue_and_kernel")?;
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| self.invalid("create_queue_and_kernel"))?;

        let queue = Queue::new(context, device, None)
            .map_err(device_error("clCreateCommandQueueWithProperties"))?;
        let kernel = ocl::core::create_kernel(program.as_core(), name)
            .map_err(device_error("clCreateKernel"))?;

        debug!(kernel = name, "created queue and kernel");
        self.queue = Some(queue);
        self.kernel = Some(kernel);
        self.kernel_name = Some(name.to_string());
        self.state = ProgramState::Queued;
        Ok(())
    }

    /// Releases kernel, queue, program and context, in that order.
    ///
    /// The program can then be initialized again, possibly for another kernel.
    pub fn reset(&mut self) {
        if self.state != ProgramState::Uninitialized {
            debug!(state = %self.state, "releasing device program");
        }
        self.kernel = None;
        self.queue = None;
        self.kernel_name = None;
        self.program = None;
        self.context = None;
        self.device = None;
        self.state = ProgramState::Uninitialized;
    }

    pub fn context(&self) -> Result<&Context> {
        self.context.as_ref().ok_or_else(|| self.invalid("context"))
    }

    pub fn kernel_name(&self) -> Option<&str> {
        self.kernel_name.as_deref()
    }

    /// Queue and kernel, available once the program is `Queued`.
    pub(crate) fn queue_and_kernel(
        &self,
        operation: &'static str,
    ) -> Result<(&Queue, &KernelCore)> {
        match (&self.queue, &self.kernel) {
            (Some(queue), Some(kernel)) => Ok((queue, kernel)),
            _ => Err(self.invalid(operation)),
        }
    }

    pub(crate) fn mark_dispatched(&mut self) {
        self.state = ProgramState::Dispatched;
    }

    fn device_and_context(&self, operation: &'static str) -> Result<(Device, &Context)> {
        match (self.device, &self.context) {
            (Some(device), Some(context)) => Ok((device, context)),
            _ => Err(self.invalid(operation)),
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ProgramState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> MatmulError {
        MatmulError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("kernel_file", &self.kernel_file)
            .field("state", &self.state)
            .field("kernel_name", &self.kernel_name)
            .finish()
    }
}
