//! GPU host orchestration for the lumo compute tools.
//!
//! Wraps wgpu for the fixed command sequence every lumo program runs:
//! select an adapter, build kernels from WGSL source, stage buffers,
//! dispatch in enqueue order, read results back.
//!
//! # Architecture
//!
//! ```text
//! VectorProcessor / EqualizeProcessor
//!     └── GpuContext (one device + one queue)
//!             ├── KernelProgram (shader module + pipelines)
//!             └── GpuTimer (timestamp queries, optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lumo_gpu::{GpuContext, VectorOp, VectorProcessor};
//!
//! let ctx = GpuContext::select(0, 0)?;
//! let proc = VectorProcessor::new(&ctx)?;
//! let run = proc.run(VectorOp::Add, &[1, 2, 3], &[4, 5, 6])?;
//! assert_eq!(run.result, vec![5, 7, 9]);
//! ```
//!
//! All operations are host-synchronous: each dispatch and each
//! readback blocks until the device has finished. Errors are terminal;
//! there is no retry path.

pub mod context;
pub mod device;
pub mod equalize;
pub mod profile;
pub mod program;
mod shaders;
pub mod vector;

pub use context::GpuContext;
pub use device::{DeviceInfo, PlatformInfo, describe, enumerate, is_available};
pub use equalize::{EqualizeProcessor, EqualizeResult};
pub use profile::KernelTiming;
pub use program::KernelProgram;
pub use vector::{VectorOp, VectorProcessor, VectorRun};

use thiserror::Error;

/// GPU operation errors
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Platform index {index} out of range ({available} available)")]
    NoSuchPlatform { index: usize, available: usize },

    #[error("Device index {index} out of range ({available} available)")]
    NoSuchDevice { index: usize, available: usize },

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Kernel build failed for '{kernel}':\n{log}")]
    KernelBuild { kernel: String, log: String },

    #[error("No kernel named '{0}' in program")]
    UnknownKernel(String),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("GPU operation failed: {0}")]
    OperationFailed(String),
}

pub type GpuResult<T> = Result<T, GpuError>;
