//! Kernel execution timing via GPU timestamp queries.
//!
//! A [`GpuTimer`] brackets one compute pass with a pair of timestamp
//! writes. On adapters without `TIMESTAMP_QUERY` no timer is created
//! and timings report as not measured instead of failing the run.

use crate::{GpuError, GpuResult};

/// Measured execution time of one kernel dispatch.
#[derive(Debug, Clone)]
pub struct KernelTiming {
    /// Kernel entry point name.
    pub kernel: &'static str,
    /// GPU execution time in nanoseconds, when the device could
    /// measure it.
    pub nanos: Option<u64>,
}

impl std::fmt::Display for KernelTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.nanos {
            Some(ns) => write!(f, "{} execution time [ns]: {ns}", self.kernel),
            None => write!(f, "{} execution time: not measured", self.kernel),
        }
    }
}

/// Timestamp query pair around a single compute pass.
pub(crate) struct GpuTimer {
    query_set: wgpu::QuerySet,
    resolve_buf: wgpu::Buffer,
    staging: wgpu::Buffer,
    period: f32,
}

impl GpuTimer {
    const SIZE: u64 = 2 * std::mem::size_of::<u64>() as u64;

    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("kernel_timer"),
            ty: wgpu::QueryType::Timestamp,
            count: 2,
        });

        let resolve_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("timer_resolve"),
            size: Self::SIZE,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("timer_staging"),
            size: Self::SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            query_set,
            resolve_buf,
            staging,
            period: queue.get_timestamp_period(),
        }
    }

    /// Timestamp writes for the start and end of one pass.
    pub(crate) fn timestamp_writes(&self) -> wgpu::ComputePassTimestampWrites<'_> {
        wgpu::ComputePassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: Some(0),
            end_of_pass_write_index: Some(1),
        }
    }

    /// Resolves the query pair into a mappable buffer. Must be encoded
    /// after the pass and before submission.
    pub(crate) fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.resolve_query_set(&self.query_set, 0..2, &self.resolve_buf, 0);
        encoder.copy_buffer_to_buffer(&self.resolve_buf, 0, &self.staging, 0, Self::SIZE);
    }

    /// Reads back the resolved timestamps. Call after the submission
    /// carrying [`resolve`](Self::resolve) has completed.
    pub(crate) fn read(&self, device: &wgpu::Device) -> GpuResult<u64> {
        let slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| GpuError::OperationFailed(format!("Timer map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let stamps: &[u64] = bytemuck::cast_slice(&data);
        let ticks = stamps[1].saturating_sub(stamps[0]);
        drop(data);
        self.staging.unmap();

        Ok((ticks as f64 * self.period as f64) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_display() {
        let t = KernelTiming {
            kernel: "hist_simple",
            nanos: Some(4096),
        };
        assert_eq!(t.to_string(), "hist_simple execution time [ns]: 4096");

        let t = KernelTiming {
            kernel: "add",
            nanos: None,
        };
        assert!(t.to_string().contains("not measured"));
    }
}
