//! CLI command implementations

pub mod equalize;
pub mod vector;

use anyhow::{Context, Result};
use lumo_gpu::GpuContext;

/// Selects the compute device and announces it, like every lumo
/// program does before queuing work.
pub fn select_device(platform: usize, device: usize) -> Result<GpuContext> {
    let ctx = GpuContext::select(platform, device)
        .with_context(|| format!("Failed to select platform {platform}, device {device}"))?;

    println!("Running on {:?}, {}", ctx.backend(), ctx.adapter_name());
    Ok(ctx)
}
