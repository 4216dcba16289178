//! Integer vector arithmetic on the GPU.

use bytemuck::cast_slice;
use tracing::trace;
use wgpu::util::DeviceExt;

use crate::profile::KernelTiming;
use crate::program::KernelProgram;
use crate::{GpuContext, GpuError, GpuResult, shaders};

/// Element-wise vector operation, one per kernel entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOp {
    /// C = A + B
    Add,
    /// C = A * B
    Mul,
    /// C = A * B + B
    MulAdd,
}

impl VectorOp {
    /// Kernel entry point implementing this operation.
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Mul => "mul",
            Self::MulAdd => "mul_add",
        }
    }
}

/// Result of one vector run.
#[derive(Debug)]
pub struct VectorRun {
    /// Output vector C.
    pub result: Vec<i32>,
    /// Kernel execution timing.
    pub timing: KernelTiming,
}

/// Stages operand vectors, dispatches one arithmetic kernel and reads
/// the result back.
pub struct VectorProcessor<'a> {
    ctx: &'a GpuContext,
    program: KernelProgram,
}

impl<'a> VectorProcessor<'a> {
    /// Builds the vector kernel program for `ctx`.
    pub fn new(ctx: &'a GpuContext) -> GpuResult<Self> {
        let source = shaders::source("vector", shaders::VECTOR);
        let program = KernelProgram::build(ctx, "vector", &source, &["add", "mul", "mul_add"])?;
        Ok(Self { ctx, program })
    }

    /// Runs `C = A op B` on the device.
    pub fn run(&self, op: VectorOp, a: &[i32], b: &[i32]) -> GpuResult<VectorRun> {
        if a.len() != b.len() {
            return Err(GpuError::BufferSizeMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }
        if a.is_empty() {
            return Ok(VectorRun {
                result: Vec::new(),
                timing: KernelTiming {
                    kernel: op.entry_point(),
                    nanos: None,
                },
            });
        }

        let device = &self.ctx.device;
        let len = a.len();
        let size_bytes = (len * std::mem::size_of::<i32>()) as u64;
        trace!(op = ?op, len, "vector run");

        let buffer_a = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vector_a"),
            contents: cast_slice(a),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let buffer_b = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vector_b"),
            contents: cast_slice(b),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let buffer_c = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vector_c"),
            size: size_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let len_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vector_len"),
            contents: bytemuck::bytes_of(&(len as u32)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let pipeline = self.program.pipeline(op.entry_point())?;
        let layout = pipeline.get_bind_group_layout(0);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vector_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffer_b.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer_c.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: len_buf.as_entire_binding(),
                },
            ],
        });

        let timer = self.ctx.timer();
        let workgroups = ((len as u32).div_ceil(256), 1, 1);
        let nanos = self.ctx.dispatch_and_wait(
            op.entry_point(),
            pipeline,
            &bind_group,
            workgroups,
            timer.as_ref(),
        )?;

        let bytes = self.ctx.download_bytes(&buffer_c, size_bytes)?;
        let result: Vec<i32> = cast_slice(&bytes).to_vec();

        Ok(VectorRun {
            result,
            timing: KernelTiming {
                kernel: op.entry_point(),
                nanos,
            },
        })
    }
}
