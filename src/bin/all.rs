//! Benchmark CLI.
//!
//! Usage:
//!   reduction-bench                         # Time each strategy once on 10 elements
//!   reduction-bench -n 1000000 -w 8         # Larger input, 8 workers
//!   reduction-bench -n 100000 -r 30         # Statistics over 30 shuffled runs
//!   reduction-bench --algorithm vector_add  # Elementwise add instead of dot product
//!   reduction-bench --verify                # Check every strategy and exit
//!   reduction-bench --list                  # List available algorithms

use clap::Parser;
use reduction_bench::cli::Cli;
use reduction_bench::config::BenchConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config: BenchConfig = Cli::parse().into();
    if let Err(e) = reduction_bench::run(&config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
