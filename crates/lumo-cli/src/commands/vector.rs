//! Vector command
//!
//! Builds the demo operand vectors, runs one arithmetic kernel and
//! prints A, B, C with the kernel execution time.

use anyhow::{Context, Result, bail};
use lumo_gpu::{VectorOp, VectorProcessor};
#[allow(unused_imports)]
use tracing::{debug, info};

use crate::VectorArgs;

pub fn run(args: VectorArgs, platform: usize, device: usize, verbose: bool) -> Result<()> {
    let op = match args.op.to_lowercase().as_str() {
        "add" => VectorOp::Add,
        "mul" | "mult" => VectorOp::Mul,
        "mul-add" | "muladd" | "multadd" => VectorOp::MulAdd,
        other => bail!("unknown operation '{other}' (expected add, mul or mul-add)"),
    };

    // The classic demo operands: A counts up, B cycles 0,1,2.
    let a: Vec<i32> = (0..args.count as i32).collect();
    let b: Vec<i32> = (0..args.count).map(|i| (i % 3) as i32).collect();

    info!(op = ?op, count = args.count, "vector run");

    let ctx = super::select_device(platform, device)?;
    let processor = VectorProcessor::new(&ctx).context("Kernel program build failed")?;

    let started = std::time::Instant::now();
    let run = processor
        .run(op, &a, &b)
        .context("Vector kernel execution failed")?;
    let host_micros = started.elapsed().as_micros();

    println!("A = {:?}", a);
    println!("B = {:?}", b);
    println!("C = {:?}", run.result);
    println!("{}", run.timing);
    if verbose {
        println!("Host round trip [us]: {host_micros}");
    }

    Ok(())
}
