//! Kernel program build with compiler diagnostics.

use std::collections::HashMap;

use tracing::debug;

use crate::{GpuContext, GpuError, GpuResult};

/// A compiled kernel program: one shader module, one compute pipeline
/// per entry point.
///
/// The module and all pipelines are created inside a validation error
/// scope so a broken kernel surfaces as [`GpuError::KernelBuild`] with
/// the compiler log attached, instead of a device panic later.
pub struct KernelProgram {
    label: &'static str,
    pipelines: HashMap<&'static str, wgpu::ComputePipeline>,
}

impl KernelProgram {
    /// Compiles `source` and builds a pipeline for each entry point.
    pub fn build(
        ctx: &GpuContext,
        label: &'static str,
        source: &str,
        entry_points: &[&'static str],
    ) -> GpuResult<Self> {
        let device = &ctx.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let mut pipelines = HashMap::with_capacity(entry_points.len());
        for &entry in entry_points {
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry),
                layout: None, // Auto layout
                module: &module,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            });
            pipelines.insert(entry, pipeline);
        }

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::KernelBuild {
                kernel: label.to_string(),
                log: err.to_string(),
            });
        }

        debug!(program = label, kernels = entry_points.len(), "kernel program built");

        Ok(Self { label, pipelines })
    }

    /// Program label (used in build diagnostics).
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Looks up the pipeline for an entry point.
    pub fn pipeline(&self, entry: &str) -> GpuResult<&wgpu::ComputePipeline> {
        self.pipelines
            .get(entry)
            .ok_or_else(|| GpuError::UnknownKernel(entry.to_string()))
    }
}
