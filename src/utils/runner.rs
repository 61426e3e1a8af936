//! Drives one harness invocation from a [`BenchConfig`].

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::registry::{build_registry, AlgorithmRegistry, AlgorithmRunner};
use crate::utils::bench::{export_csv, time_seed, RawTimingData};
use crate::utils::generator::VectorGenerator;
use crate::utils::timer::{measure_variants, run_once, Timing, VariantResult};
use crate::utils::tui;

/// Execute whatever `config` asks for: list, verify or benchmark.
///
/// # Errors
/// Invalid configuration, an unknown algorithm, or the first strategy
/// failure. Nothing is retried.
pub fn run(config: &BenchConfig) -> Result<()> {
    config.validate()?;

    let device = config.backend.create()?;
    let registry = build_registry(config.workers, device.clone())?;

    if config.list {
        tui::print_available_algorithms(&registry);
        return Ok(());
    }

    let algo = find_algorithm(&registry, &config.algorithm)?;

    if config.verify {
        algo.verify()?;
        println!("{}: all variants match the sequential baseline", algo.name());
        return Ok(());
    }

    if config.runs == 1 {
        let timings = run_single(algo, config)?;
        tui::print_timings(&timings);
        return Ok(());
    }

    tui::print_header();
    tui::print_algo_info_box(algo, device.name());
    let results = run_measured(algo, config)?;
    tui::print_results_table(&results, config.size, config.workers);
    println!("Note: Speedup is relative to the first variant ('sequential').");

    if let Some(path) = &config.csv {
        let rows: Vec<RawTimingData> = results
            .iter()
            .map(|r| RawTimingData::from_result(algo.name(), config.size, config.workers, r))
            .collect();
        export_csv(path, &rows)?;
        log::info!("wrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}

fn find_algorithm<'r>(registry: &'r AlgorithmRegistry, name: &str) -> Result<&'r dyn AlgorithmRunner> {
    registry.find(name).ok_or_else(|| {
        BenchError::Config(format!(
            "algorithm '{}' not found, available: {}",
            name,
            registry.list_names().join(", ")
        ))
    })
}

fn input_seed(config: &BenchConfig) -> u64 {
    let seed = config.seed.unwrap_or_else(time_seed);
    log::debug!("input seed {}", seed);
    seed
}

/// Generate inputs once and time every strategy a single time, in order.
pub fn run_single(algo: &dyn AlgorithmRunner, config: &BenchConfig) -> Result<Vec<Timing>> {
    let inputs = VectorGenerator::new(input_seed(config)).pair(config.size);
    run_once(algo.get_variants(&inputs))
}

/// Generate inputs once and sample every strategy `config.runs` times.
pub fn run_measured(algo: &dyn AlgorithmRunner, config: &BenchConfig) -> Result<Vec<VariantResult>> {
    let inputs = VectorGenerator::new(input_seed(config)).pair(config.size);
    measure_variants(algo.get_variants(&inputs), &config.timing())
}
