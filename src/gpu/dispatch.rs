//! Buffer setup, launch and read-back for the naive kernel.

use std::path::PathBuf;

use ocl::core::ArgVal;
use ocl::{Buffer, MemFlags};
use tracing::{debug, warn};

use super::program::{Program, ProgramState};
use super::{KERNEL_FILE, KERNEL_NAME, build_options, device_error};
use crate::config::EngineConfig;
use crate::error::{MatmulError, Result};
use crate::Element;

/// Runs one product on a `Queued` program and returns C (m × n).
///
/// A and B go into read-only buffers, C into a write-only one. The read of
/// C blocks until the launch has finished. Buffers are dropped on return,
/// whether or not the launch succeeded.
///
/// # Errors
///
/// [`MatmulError::InvalidState`] unless the program is `Queued` (or has
/// already dispatched), and [`MatmulError::Device`] for driver failures.
pub fn dispatch<T: Element>(
    program: &mut Program,
    a: &[T],
    b: &[T],
    m: usize,
    n: usize,
    k: usize,
) -> Result<Vec<T>> {
    if !matches!(program.state(), ProgramState::Queued | ProgramState::Dispatched) {
        return Err(MatmulError::InvalidState {
            operation: "dispatch",
            state: program.state().to_string(),
        });
    }
    if m == 0 || n == 0 || k == 0 {
        return Ok(vec![T::default(); m * n]);
    }

    let (queue, kernel) = program.queue_and_kernel("dispatch")?;

    let a_buf = Buffer::<T>::builder()
        .queue(queue.clone())
        .flags(MemFlags::new().read_only())
        .len(a.len())
        .copy_host_slice(a)
        .build()
        .map_err(device_error("clCreateBuffer"))?;
    let b_buf = Buffer::<T>::builder()
        .queue(queue.clone())
        .flags(MemFlags::new().read_only())
        .len(b.len())
        .copy_host_slice(b)
        .build()
        .map_err(device_error("clCreateBuffer"))?;
    let c_buf = Buffer::<T>::builder()
        .queue(queue.clone())
        .flags(MemFlags::new().write_only())
        .len(m * n)
        .build()
        .map_err(device_error("clCreateBuffer"))?;

    let (m_arg, k_arg, n_arg) = (dim_arg(m)?, dim_arg(k)?, dim_arg(n)?);
    let set_arg = |index: u32, arg| {
        ocl::core::set_kernel_arg(kernel, index, arg).map_err(device_error("clSetKernelArg"))
    };
    set_arg(0, ArgVal::mem(a_buf.as_core()))?;
    set_arg(1, ArgVal::mem(b_buf.as_core()))?;
    set_arg(2, ArgVal::mem(c_buf.as_core()))?;
    set_arg(3, ArgVal::scalar(&m_arg))?;
    set_arg(4, ArgVal::scalar(&k_arg))?;
    set_arg(5, ArgVal::scalar(&n_arg))?;

    // SAFETY: every argument is bound above and the global size matches the
    // kernel's bounds guard on (row, col).
    unsafe {
        ocl::core::enqueue_kernel(
            queue.as_core(),
            kernel,
            2,
            None,
            &[m, n, 1],
            None,
            None::<&ocl::core::Event>,
            None::<&mut ocl::core::Event>,
        )
        .map_err(device_error("clEnqueueNDRangeKernel"))?;
    }

    let mut c = vec![T::default(); m * n];
    c_buf
        .read(&mut c)
        .enq()
        .map_err(device_error("clEnqueueReadBuffer"))?;

    debug!(m, n, k, dtype = %T::DATA_TYPE, "device dispatch complete");
    program.mark_dispatched();
    Ok(c)
}

/// Builds the kernel for `T` from source and caches the binary.
///
/// Returns the path of the saved binary. Run this once before timing the
/// GPU strategy so the first timed call doesn't pay for compilation.
pub fn prepare_gpu_binary<T: Element>(config: &EngineConfig) -> Result<PathBuf> {
    let mut program = Program::new(KERNEL_FILE, config).with_binary_tag(T::CL_TYPE);
    program.initialize()?;
    program.build(&build_options::<T>())?;
    program.save_binary()
}

/// The GPU strategy: C = A × B with the naive OpenCL kernel.
///
/// Loads the cached binary for `T` when present. If it is missing or the
/// driver rejects it, builds from source and refreshes the cache.
pub fn multiply_naive_ocl<T: Element>(
    a: &[T],
    b: &[T],
    m: usize,
    n: usize,
    k: usize,
    config: &EngineConfig,
) -> Result<Vec<T>> {
    let mut program = Program::new(KERNEL_FILE, config).with_binary_tag(T::CL_TYPE);
    program.initialize()?;

    let binary = program.binary_path();
    let loaded = if binary.is_file() {
        match program.load_from_binary() {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %binary.display(), error = %err, "cached binary rejected, rebuilding");
                false
            }
        }
    } else {
        warn!(path = %binary.display(), "no cached binary, building from source");
        false
    };

    if !loaded {
        program.build(&build_options::<T>())?;
        if let Err(err) = program.save_binary() {
            warn!(error = %err, "could not cache program binary");
        }
    }

    program.create_queue_and_kernel(KERNEL_NAME)?;
    dispatch(&mut program, a, b, m, n, k)
}

fn dim_arg(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| MatmulError::Device {
        operation: "clSetKernelArg",
        message: format!("dimension {} exceeds the kernel's int range", value),
    })
}
