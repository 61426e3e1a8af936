//! Command-line interface.

use crate::config::{Backend, BenchConfig};
use clap::Parser;
use std::path::PathBuf;

/// Compare sequential, chunked-parallel and accelerator strategies.
#[derive(Parser, Debug)]
#[command(name = "reduction-bench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of elements per input vector
    #[arg(short = 'n', long, default_value = "10")]
    pub size: usize,

    /// Worker count of the chunked-parallel strategy
    #[arg(short, long, default_value = "200")]
    pub workers: usize,

    /// Seed for input generation (default: time-based)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Algorithm to benchmark
    #[arg(long, default_value = "dot_product")]
    pub algorithm: String,

    /// Device for the accelerator strategy
    #[arg(long, value_enum, default_value_t = Backend::Software)]
    pub backend: Backend,

    /// Timed runs per strategy; more than one prints a statistics table
    #[arg(short, long, default_value = "1")]
    pub runs: usize,

    /// Warmup iterations per strategy in multi-run mode
    #[arg(long, default_value = "2")]
    pub warmup: usize,

    /// Export multi-run statistics to CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Check every strategy against the sequential baseline and exit
    #[arg(long)]
    pub verify: bool,

    /// List available algorithms
    #[arg(short, long)]
    pub list: bool,
}

impl From<Cli> for BenchConfig {
    fn from(cli: Cli) -> Self {
        Self {
            size: cli.size,
            workers: cli.workers,
            seed: cli.seed,
            algorithm: cli.algorithm,
            backend: cli.backend,
            runs: cli.runs,
            warmup: cli.warmup,
            csv: cli.csv,
            verify: cli.verify,
            list: cli.list,
        }
    }
}
