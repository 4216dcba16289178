//! WGSL kernel sources for the lumo compute pipelines.
//!
//! Kernels are grouped one module per program, mirroring the on-disk
//! layout: a `kernels/<name>.wgsl` file next to the working directory
//! overrides the embedded source, so the device code can be edited
//! without rebuilding the host programs.

use std::borrow::Cow;
use std::path::Path;

use tracing::info;

/// Resolves kernel source: `kernels/<name>.wgsl` when present,
/// embedded default otherwise.
pub(crate) fn source(name: &str, embedded: &'static str) -> Cow<'static, str> {
    let path = Path::new("kernels").join(format!("{name}.wgsl"));
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!(path = %path.display(), "using on-disk kernel source");
            Cow::Owned(text)
        }
        Err(_) => Cow::Borrowed(embedded),
    }
}

/// Integer vector arithmetic: C = A op B.
pub const VECTOR: &str = r#"
@group(0) @binding(0) var<storage, read> a: array<i32>;
@group(0) @binding(1) var<storage, read> b: array<i32>;
@group(0) @binding(2) var<storage, read_write> c: array<i32>;
@group(0) @binding(3) var<uniform> len: u32;

@compute @workgroup_size(256)
fn add(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= len { return; }
    c[i] = a[i] + b[i];
}

@compute @workgroup_size(256)
fn mul(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= len { return; }
    c[i] = a[i] * b[i];
}

@compute @workgroup_size(256)
fn mul_add(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= len { return; }
    c[i] = a[i] * b[i] + b[i];
}
"#;

/// Histogram equalization chain. Pixels travel widened to u32 because
/// storage buffers have no 8-bit element type.
pub const HISTOGRAM: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<u32>;
@group(0) @binding(1) var<storage, read_write> bins: array<atomic<u32>, 256>;
@group(0) @binding(2) var<storage, read_write> cum: array<u32, 256>;
@group(0) @binding(3) var<storage, read_write> lut: array<u32, 256>;
@group(0) @binding(4) var<storage, read_write> dst: array<u32>;
@group(0) @binding(5) var<uniform> len: u32;

// Per-intensity counts: one invocation per pixel, atomic binning.
@compute @workgroup_size(256)
fn hist_simple(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= len { return; }
    atomicAdd(&bins[src[i]], 1u);
}

// Running totals: one invocation per bin sums everything below it.
@compute @workgroup_size(256)
fn hist_cumulative(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= 256u { return; }
    var total = 0u;
    for (var j = 0u; j <= i; j = j + 1u) {
        total = total + atomicLoad(&bins[j]);
    }
    cum[i] = total;
}

// Normalized remapping table: lut[i] = round(cum[i] * 255 / total).
@compute @workgroup_size(256)
fn lut_build(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= 256u { return; }
    let total = cum[255u];
    if total == 0u {
        lut[i] = i;
    } else {
        lut[i] = (cum[i] * 255u + total / 2u) / total;
    }
}

// Contrast stretch: redirect every pixel through the table.
@compute @workgroup_size(256)
fn lut_apply(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= len { return; }
    dst[i] = lut[src[i]];
}
"#;
