//! Equalize command
//!
//! Loads an image, runs the GPU histogram equalization pipeline,
//! prints the three 256-bin tables with per-kernel timings, optionally
//! writes the result, then shows the before/after window.

use anyhow::{Context, Result};
use lumo_gpu::EqualizeProcessor;
#[allow(unused_imports)]
use tracing::{debug, info};

use crate::EqualizeArgs;

pub fn run(args: EqualizeArgs, platform: usize, device: usize, verbose: bool) -> Result<()> {
    let image = lumo_io::read(&args.file)
        .with_context(|| format!("Failed to load: {}", args.file.display()))?;

    info!(
        path = %args.file.display(),
        width = image.width,
        height = image.height,
        channels = image.channels,
        "equalize run"
    );
    if verbose {
        println!(
            "Loaded {} ({}x{}, {} channel(s))",
            args.file.display(),
            image.width,
            image.height,
            image.channels
        );
    }

    let ctx = super::select_device(platform, device)?;
    let processor = EqualizeProcessor::new(&ctx).context("Kernel program build failed")?;

    let result = processor
        .run(&image)
        .context("Equalization pipeline failed")?;

    let timing = |i: usize| &result.timings[i];
    println!("Histogram [simple]: {:?}", result.histogram.0);
    println!("  {}", timing(0));
    println!("Histogram [cumulative]: {:?}", result.cumulative.0);
    println!("  {}", timing(1));
    println!("Histogram [normalised & LUT]: {:?}", result.lut.0);
    println!("  {}", timing(2));
    println!("  {}", timing(3));

    if let Some(output) = &args.output {
        lumo_io::write(output, &result.image)
            .with_context(|| format!("Failed to save: {}", output.display()))?;
        if verbose {
            println!("Wrote {}", output.display());
        }
    }

    if !args.no_view {
        show(&image, &result, &args, verbose);
    }

    Ok(())
}

#[cfg(feature = "viewer")]
fn show(
    image: &lumo_core::Image,
    result: &lumo_gpu::EqualizeResult,
    args: &EqualizeArgs,
    verbose: bool,
) {
    let config = lumo_view::ViewerConfig {
        title: format!(
            "lumo equalize - {}",
            args.file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image")
        ),
        verbose: verbose as u8,
    };

    let code = lumo_view::run(image, &result.image, config);
    if code != 0 {
        std::process::exit(code);
    }
}

#[cfg(not(feature = "viewer"))]
fn show(
    _image: &lumo_core::Image,
    _result: &lumo_gpu::EqualizeResult,
    _args: &EqualizeArgs,
    _verbose: bool,
) {
    println!("(viewer disabled at build time; use -o to save the result)");
}
