//! Multi-threaded strategies.
//!
//! Every strategy spawns its own scoped threads per call and joins them
//! before returning. Workers only write output regions they exclusively
//! own, so no locking is needed:
//!
//! - `row`: one thread per row of C
//! - `element`: one thread per element of C
//! - `simd_mt`: row blocks split across `max(4, cpus)` workers running the SIMD kernel

pub mod element;
pub mod partition;
pub mod row;
pub mod simd_mt;

pub use element::matmul_thread_per_element;
pub use partition::partition_row_blocks;
pub use row::matmul_thread_per_row;
pub use simd_mt::matmul_simd_mt;
