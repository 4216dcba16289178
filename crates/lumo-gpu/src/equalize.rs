//! Histogram equalization pipeline on the GPU.
//!
//! Fixed dispatch order, one submission per kernel:
//! `hist_simple` -> `hist_cumulative` -> `lut_build` -> `lut_apply`.
//! Every intermediate table is read back so callers can print the
//! histogram, its running totals and the derived remapping table.

use bytemuck::cast_slice;
use lumo_core::{BIN_COUNT, CumulativeHistogram, Histogram, Image, Lut};
use tracing::trace;
use wgpu::util::DeviceExt;

use crate::profile::KernelTiming;
use crate::program::KernelProgram;
use crate::{GpuContext, GpuError, GpuResult, shaders};

const ENTRY_POINTS: [&str; 4] = ["hist_simple", "hist_cumulative", "lut_build", "lut_apply"];
const BIN_BYTES: u64 = (BIN_COUNT * std::mem::size_of::<u32>()) as u64;

/// Everything the equalization pipeline produces.
#[derive(Debug)]
pub struct EqualizeResult {
    /// Per-intensity pixel counts.
    pub histogram: Histogram,
    /// Running totals of the histogram.
    pub cumulative: CumulativeHistogram,
    /// Derived remapping table.
    pub lut: Lut,
    /// Contrast-stretched output image (single channel).
    pub image: Image,
    /// Per-kernel execution timings, in dispatch order.
    pub timings: Vec<KernelTiming>,
}

/// Stages an image, runs the four histogram kernels in order and reads
/// every table back.
pub struct EqualizeProcessor<'a> {
    ctx: &'a GpuContext,
    program: KernelProgram,
}

impl<'a> EqualizeProcessor<'a> {
    /// Builds the histogram kernel program for `ctx`.
    pub fn new(ctx: &'a GpuContext) -> GpuResult<Self> {
        let source = shaders::source("histogram", shaders::HISTOGRAM);
        let program = KernelProgram::build(ctx, "histogram", &source, &ENTRY_POINTS)?;
        Ok(Self { ctx, program })
    }

    /// Runs the full pipeline over `image`.
    ///
    /// RGB input is collapsed to luma first; binning operates on a
    /// single intensity channel.
    pub fn run(&self, image: &Image) -> GpuResult<EqualizeResult> {
        let luma = image.to_luma();
        let pixel_count = luma.pixel_count();
        trace!(
            width = luma.width,
            height = luma.height,
            pixels = pixel_count,
            "equalize run"
        );

        let device = &self.ctx.device;

        // Storage buffers have no 8-bit element type; pixels travel
        // widened to u32.
        let widened: Vec<u32> = luma.data().iter().map(|&px| px as u32).collect();
        let image_bytes = (pixel_count * std::mem::size_of::<u32>()) as u64;

        let src = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("image_input"),
            contents: cast_slice(&widened),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let dst = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("image_output"),
            size: image_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let bin_buffer = |label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: BIN_BYTES,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let bins = bin_buffer("hist_bins");
        let cum = bin_buffer("hist_cumulative");
        let lut = bin_buffer("hist_lut");

        let len_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pixel_count"),
            contents: bytemuck::bytes_of(&(pixel_count as u32)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // The binning kernels accumulate, so their outputs start at zero.
        self.ctx.clear_buffers(&[&bins, &cum, &lut]);

        let pixel_groups = (pixel_count as u32).div_ceil(256);
        let mut timings = Vec::with_capacity(ENTRY_POINTS.len());

        self.dispatch(
            "hist_simple",
            &[(0, &src), (1, &bins), (5, &len_buf)],
            (pixel_groups, 1, 1),
            &mut timings,
        )?;
        self.dispatch(
            "hist_cumulative",
            &[(1, &bins), (2, &cum)],
            (1, 1, 1),
            &mut timings,
        )?;
        self.dispatch("lut_build", &[(2, &cum), (3, &lut)], (1, 1, 1), &mut timings)?;
        self.dispatch(
            "lut_apply",
            &[(0, &src), (3, &lut), (4, &dst), (5, &len_buf)],
            (pixel_groups, 1, 1),
            &mut timings,
        )?;

        let histogram = Histogram(self.download_bins(&bins)?);
        let cumulative = CumulativeHistogram(self.download_bins(&cum)?);
        let lut_wide = self.download_bins(&lut)?;
        let mut lut_table = [0u8; BIN_COUNT];
        for (narrow, &wide) in lut_table.iter_mut().zip(lut_wide.iter()) {
            *narrow = wide as u8;
        }

        let out_bytes = self.ctx.download_bytes(&dst, image_bytes)?;
        let out_pixels: Vec<u8> = cast_slice::<u8, u32>(&out_bytes)
            .iter()
            .map(|&px| px as u8)
            .collect();
        let out_image = Image::from_raw(out_pixels, luma.width, luma.height, 1)
            .map_err(|e| GpuError::OperationFailed(e.to_string()))?;

        Ok(EqualizeResult {
            histogram,
            cumulative,
            lut: Lut(lut_table),
            image: out_image,
            timings,
        })
    }

    /// One kernel dispatch with exactly the bindings its entry point
    /// declares.
    fn dispatch(
        &self,
        entry: &'static str,
        bindings: &[(u32, &wgpu::Buffer)],
        workgroups: (u32, u32, u32),
        timings: &mut Vec<KernelTiming>,
    ) -> GpuResult<()> {
        let pipeline = self.program.pipeline(entry)?;
        let layout = pipeline.get_bind_group_layout(0);

        let entries: Vec<wgpu::BindGroupEntry> = bindings
            .iter()
            .map(|&(binding, buffer)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(entry),
            layout: &layout,
            entries: &entries,
        });

        let timer = self.ctx.timer();
        let nanos =
            self.ctx
                .dispatch_and_wait(entry, pipeline, &bind_group, workgroups, timer.as_ref())?;

        timings.push(KernelTiming {
            kernel: entry,
            nanos,
        });
        Ok(())
    }

    fn download_bins(&self, buffer: &wgpu::Buffer) -> GpuResult<[u32; BIN_COUNT]> {
        let bytes = self.ctx.download_bytes(buffer, BIN_BYTES)?;
        let words: &[u32] = cast_slice(&bytes);
        words
            .try_into()
            .map_err(|_| GpuError::OperationFailed("short bin readback".into()))
    }
}
