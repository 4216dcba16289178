//! GPU context and device management.

use std::sync::Arc;

use tracing::{debug, info};
use wgpu::{Device, DeviceDescriptor, Features, Instance, Limits, Queue};

use crate::device::adapters_by_platform;
use crate::profile::GpuTimer;
use crate::{GpuError, GpuResult};

/// GPU context holding the selected device and its single command queue.
///
/// All submissions go through this one queue and every helper blocks
/// until the device has drained it, so callers observe the strictly
/// ordered, host-synchronous model the lumo programs assume.
pub struct GpuContext {
    pub(crate) device: Arc<Device>,
    pub(crate) queue: Arc<Queue>,
    adapter_info: wgpu::AdapterInfo,
    timestamps: bool,
}

impl GpuContext {
    /// Selects the device at `(platform_idx, device_idx)`.
    ///
    /// Platforms are wgpu backends in enumeration order; see
    /// [`crate::device::enumerate`] for the mapping.
    pub fn select(platform_idx: usize, device_idx: usize) -> GpuResult<Self> {
        pollster::block_on(Self::select_async(platform_idx, device_idx))
    }

    /// Async device selection.
    async fn select_async(platform_idx: usize, device_idx: usize) -> GpuResult<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let mut platforms = adapters_by_platform(&instance);
        if platforms.is_empty() {
            return Err(GpuError::NoAdapter);
        }

        let available = platforms.len();
        if platform_idx >= available {
            return Err(GpuError::NoSuchPlatform {
                index: platform_idx,
                available,
            });
        }
        let (_, mut adapters) = platforms.swap_remove(platform_idx);

        let available = adapters.len();
        if device_idx >= available {
            return Err(GpuError::NoSuchDevice {
                index: device_idx,
                available,
            });
        }
        let adapter = adapters.swap_remove(device_idx);
        let adapter_info = adapter.get_info();

        // Request timestamp queries only where the adapter offers them;
        // profiling degrades to "not measured" otherwise.
        let timestamps = adapter.features().contains(Features::TIMESTAMP_QUERY);
        let required_features = if timestamps {
            Features::TIMESTAMP_QUERY
        } else {
            Features::empty()
        };

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("lumo-gpu"),
                    required_features,
                    required_limits: Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        info!(
            device = %adapter_info.name,
            backend = ?adapter_info.backend,
            timestamps,
            "selected compute device"
        );

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
            timestamps,
        })
    }

    /// Adapter name (GPU model).
    pub fn adapter_name(&self) -> &str {
        &self.adapter_info.name
    }

    /// Backend the device runs on (Vulkan, Metal, DX12, ...).
    pub fn backend(&self) -> wgpu::Backend {
        self.adapter_info.backend
    }

    /// Whether GPU timestamp profiling is available.
    pub fn supports_timestamps(&self) -> bool {
        self.timestamps
    }

    /// Creates a per-dispatch timer, or `None` without timestamp support.
    pub(crate) fn timer(&self) -> Option<GpuTimer> {
        self.timestamps.then(|| GpuTimer::new(&self.device, &self.queue))
    }

    /// Encodes one compute pass, submits it and blocks until done.
    ///
    /// Returns the kernel execution time in nanoseconds when a timer
    /// was attached.
    pub(crate) fn dispatch_and_wait(
        &self,
        label: &'static str,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        workgroups: (u32, u32, u32),
        timer: Option<&GpuTimer>,
    ) -> GpuResult<Option<u64>> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: timer.map(GpuTimer::timestamp_writes),
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups.0, workgroups.1, workgroups.2);
        }

        if let Some(timer) = timer {
            timer.resolve(&mut encoder);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);

        debug!(kernel = label, "dispatch complete");

        match timer {
            Some(timer) => Ok(Some(timer.read(&self.device)?)),
            None => Ok(None),
        }
    }

    /// Zero-fills device buffers before kernels accumulate into them.
    pub(crate) fn clear_buffers(&self, buffers: &[&wgpu::Buffer]) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_buffers"),
            });
        for buffer in buffers {
            encoder.clear_buffer(buffer, 0, None);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Copies a device buffer back to host memory, blocking until the
    /// copy completes.
    pub(crate) fn download_bytes(&self, src: &wgpu::Buffer, size: u64) -> GpuResult<Vec<u8>> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_buffer_to_buffer(src, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| GpuError::OperationFailed(format!("Map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result = data.to_vec();
        drop(data);
        staging.unmap();

        Ok(result)
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("device", &self.adapter_info.name)
            .field("backend", &self.adapter_info.backend)
            .field("timestamps", &self.timestamps)
            .finish()
    }
}
