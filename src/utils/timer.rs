//! Wall-clock timing for benchmark variants.
//!
//! Two modes:
//! - [`with_timing`] / [`run_once`]: time a single execution of each
//!   variant, in registration order.
//! - [`measure_variants`]: warm every variant up, then collect samples in
//!   a shuffled order to avoid ordering bias, and summarise them.
//!
//! A failing variant aborts the measurement; nothing is retried.

use crate::error::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use super::bench::time_seed;

/// Configuration for repeated measurements
#[derive(Clone, Debug)]
pub struct TimingConfig {
    /// Number of samples to collect per variant (default: 30)
    pub runs_per_variant: usize,
    /// Number of warmup iterations before measurement (default: 10)
    pub warmup_iterations: usize,
    /// Seed for the sample schedule shuffle (default: time-based)
    pub schedule_seed: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            runs_per_variant: 30,
            warmup_iterations: 10,
            schedule_seed: None,
        }
    }
}

/// A variant to be measured
pub struct Variant<'a> {
    /// Unique name of the variant
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// One execution; returns a sample of the result for cross-checking
    pub run: Box<dyn FnMut() -> Result<Option<f64>> + 'a>,
}

/// Outcome of a single timed execution.
#[derive(Clone, Debug)]
pub struct Timing {
    pub name: String,
    pub elapsed: Duration,
    pub result: Option<f64>,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} sec)", self.name, self.elapsed.as_secs_f64())
    }
}

/// Result from measuring a single variant
#[derive(Clone, Debug)]
pub struct VariantResult {
    /// Name of the variant
    pub name: String,
    /// Description of the variant
    pub description: String,
    pub avg_time: Duration,
    pub median_time: Duration,
    pub min_time: Duration,
    pub max_time: Duration,
    pub std_dev: Duration,
    /// Number of measured samples
    pub samples: usize,
    /// Last observed result value, for cross-variant comparison
    pub result_sample: Option<f64>,
}

/// Time one call of `f`, logging the elapsed wall-clock time.
///
/// Errors from `f` are returned as-is.
pub fn with_timing<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<(T, Duration)> {
    let start = Instant::now();
    let value = f()?;
    let elapsed = start.elapsed();
    log::info!("{} finished in {:?}", name, elapsed);
    Ok((value, elapsed))
}

/// Execute every variant exactly once, in order.
pub fn run_once(variants: Vec<Variant<'_>>) -> Result<Vec<Timing>> {
    variants
        .into_iter()
        .map(|mut variant| {
            let (result, elapsed) = with_timing(variant.name, || (variant.run)())?;
            Ok(Timing {
                name: variant.name.to_string(),
                elapsed,
                result,
            })
        })
        .collect()
}

/// Measure multiple variants with randomized execution order.
///
/// 1. Warms up all variants
/// 2. Creates a shuffled task schedule
/// 3. Times each scheduled execution
/// 4. Summarises the samples per variant
pub fn measure_variants(mut variants: Vec<Variant<'_>>, config: &TimingConfig) -> Result<Vec<VariantResult>> {
    if variants.is_empty() {
        return Ok(Vec::new());
    }

    let samples = config.runs_per_variant;

    for variant in &mut variants {
        for _ in 0..config.warmup_iterations {
            black_box((variant.run)()?);
        }
    }

    // (variant_idx, sample_idx)
    let mut tasks: Vec<(usize, usize)> = (0..variants.len())
        .flat_map(|v| (0..samples).map(move |s| (v, s)))
        .collect();
    let mut rng = StdRng::seed_from_u64(config.schedule_seed.unwrap_or_else(time_seed));
    tasks.shuffle(&mut rng);

    let mut measurements: Vec<Vec<Duration>> = (0..variants.len())
        .map(|_| Vec::with_capacity(samples))
        .collect();
    let mut result_samples: Vec<Option<f64>> = vec![None; variants.len()];

    for (variant_idx, _) in tasks {
        let variant = &mut variants[variant_idx];
        let start = Instant::now();
        let result = black_box((variant.run)()?);
        measurements[variant_idx].push(start.elapsed());
        result_samples[variant_idx] = result;
    }

    Ok(variants
        .into_iter()
        .enumerate()
        .map(|(idx, variant)| {
            let times = std::mem::take(&mut measurements[idx]);
            compute_variant_result(variant.name, variant.description, &times, result_samples[idx])
        })
        .collect())
}

/// Compute statistics from raw measurements
fn compute_variant_result(
    name: &'static str,
    description: &'static str,
    times: &[Duration],
    result_sample: Option<f64>,
) -> VariantResult {
    let mut result = VariantResult {
        name: name.to_string(),
        description: description.to_string(),
        avg_time: Duration::ZERO,
        median_time: Duration::ZERO,
        min_time: Duration::ZERO,
        max_time: Duration::ZERO,
        std_dev: Duration::ZERO,
        samples: times.len(),
        result_sample,
    };
    if times.is_empty() {
        return result;
    }

    let nanos: Vec<f64> = times.iter().map(|t| t.as_nanos() as f64).collect();
    let avg = nanos.iter().sum::<f64>() / nanos.len() as f64;
    let variance = nanos.iter().map(|n| (n - avg) * (n - avg)).sum::<f64>() / (nanos.len() - 1).max(1) as f64;

    result.avg_time = Duration::from_nanos(avg as u64);
    result.median_time = calculate_median(times);
    result.min_time = times.iter().copied().min().unwrap_or_default();
    result.max_time = times.iter().copied().max().unwrap_or_default();
    result.std_dev = Duration::from_nanos(variance.sqrt() as u64);
    result
}

/// Calculate median from a slice of durations.
pub fn calculate_median(times: &[Duration]) -> Duration {
    if times.is_empty() {
        return Duration::ZERO;
    }
    let mut sorted: Vec<_> = times.to_vec();
    sorted.sort();
    sorted[sorted.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    fn constant(name: &'static str, value: f64) -> Variant<'static> {
        Variant {
            name,
            description: "constant",
            run: Box::new(move || Ok(Some(value))),
        }
    }

    #[test]
    fn test_measure_variants_empty() {
        let results = measure_variants(vec![], &TimingConfig::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_measure_variants_counts_samples() {
        let mut calls = 0;
        let variants = vec![Variant {
            name: "counted",
            description: "counts calls",
            run: Box::new(|| {
                calls += 1;
                Ok(Some(42.0))
            }),
        }];
        let config = TimingConfig {
            runs_per_variant: 5,
            warmup_iterations: 2,
            schedule_seed: Some(1),
        };

        let results = measure_variants(variants, &config).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].samples, 5);
        assert_eq!(results[0].result_sample, Some(42.0));
        assert!(results[0].min_time <= results[0].median_time);
        assert!(results[0].median_time <= results[0].max_time);
        assert_eq!(calls, 7);
    }

    #[test]
    fn test_measure_variants_keeps_registration_order() {
        let config = TimingConfig {
            runs_per_variant: 3,
            warmup_iterations: 0,
            schedule_seed: Some(9),
        };
        let results =
            measure_variants(vec![constant("first", 1.0), constant("second", 2.0)], &config).unwrap();
        assert_eq!(results[0].name, "first");
        assert_eq!(results[1].name, "second");
        assert_eq!(results[1].result_sample, Some(2.0));
    }

    #[test]
    fn test_failure_propagates() {
        let variants = vec![
            constant("ok", 1.0),
            Variant {
                name: "broken",
                description: "always fails",
                run: Box::new(|| Err(BenchError::worker(0, "nope"))),
            },
        ];
        let err = measure_variants(variants, &TimingConfig::default()).unwrap_err();
        assert!(matches!(err, BenchError::Worker { chunk: 0, .. }));
    }

    #[test]
    fn test_run_once_in_order() {
        let timings = run_once(vec![constant("a", 1.0), constant("b", 2.0)]).unwrap();
        let names: Vec<&str> = timings.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(timings[1].result, Some(2.0));
    }

    #[test]
    fn test_timing_display() {
        let timing = Timing {
            name: "sequential".to_string(),
            elapsed: Duration::from_millis(1500),
            result: None,
        };
        assert_eq!(timing.to_string(), "sequential (1.5 sec)");
    }

    #[test]
    fn test_calculate_median() {
        let times = [3, 1, 2].map(Duration::from_millis);
        assert_eq!(calculate_median(&times), Duration::from_millis(2));
        assert_eq!(calculate_median(&[]), Duration::ZERO);
    }
}
