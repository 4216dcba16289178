//! lumo - GPU compute CLI
//!
//! Instructional GPU programs behind one binary: integer vector
//! arithmetic and image histogram equalization, both executed as
//! device kernels through wgpu.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "lumo")]
#[command(author, version, about = "GPU compute tools: vector arithmetic and histogram equalization")]
#[command(long_about = "
Small GPU compute programs driven through wgpu.

Examples:
  lumo -l                               # list platforms and devices
  lumo vector                           # C = A + B on the default device
  lumo vector --op mul-add -n 1000      # larger vectors, C = A * B + B
  lumo -p 1 -d 0 vector                 # pick platform/device explicitly
  lumo equalize -f test.pgm             # equalize and show before/after
  lumo equalize -f photo.ppm -o out.pgm --no-view
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Select platform (backend) index
    #[arg(short = 'p', long, global = true, default_value = "0")]
    platform: usize,

    /// Select device index within the platform
    #[arg(short = 'd', long, global = true, default_value = "0")]
    device: usize,

    /// List all platforms and devices, then exit
    #[arg(short = 'l', long, global = true)]
    list: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run element-wise vector arithmetic on the GPU
    #[command(visible_alias = "v")]
    Vector(VectorArgs),

    /// Histogram-equalize an image on the GPU
    #[command(visible_alias = "eq")]
    Equalize(EqualizeArgs),
}

#[derive(Args)]
struct VectorArgs {
    /// Operation: add, mul, mul-add
    #[arg(long, default_value = "add")]
    op: String,

    /// Vector length
    #[arg(short = 'n', long, default_value = "10")]
    count: usize,
}

#[derive(Args)]
struct EqualizeArgs {
    /// Input image file (PGM or PPM)
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Write the equalized image here (binary PGM)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the before/after window
    #[arg(long)]
    no_view: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.list {
        print!("{}", lumo_gpu::describe());
        return Ok(());
    }

    match cli.command {
        Some(Commands::Vector(args)) => {
            commands::vector::run(args, cli.platform, cli.device, cli.verbose)
        }
        Some(Commands::Equalize(args)) => {
            commands::equalize::run(args, cli.platform, cli.device, cli.verbose)
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "warn,lumo_core=debug,lumo_io=debug,lumo_gpu=debug,lumo_view=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::parse_from(["lumo", "-p", "1", "vector", "-d", "2"]);
        assert_eq!(cli.platform, 1);
        assert_eq!(cli.device, 2);
        assert!(matches!(cli.command, Some(Commands::Vector(_))));
    }

    #[test]
    fn list_without_subcommand_parses() {
        let cli = Cli::parse_from(["lumo", "-l"]);
        assert!(cli.list);
        assert!(cli.command.is_none());
    }
}
