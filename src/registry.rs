//! Algorithm registry for dynamic algorithm discovery and execution.
//!
//! Every benchmarked algorithm exposes its strategies through the same
//! interface so the runner can time, verify and report them uniformly.

use crate::accel::Accelerator;
use crate::error::{BenchError, Result};
use crate::utils::generator::VectorPair;
use crate::utils::timer::Variant;
use std::sync::Arc;

/// Relative tolerance allowed between a strategy and the sequential baseline
pub const VERIFY_TOLERANCE: f64 = 1e-4;

/// Input size used by `verify`; deliberately not a multiple of common chunk counts
pub const VERIFY_SIZE: usize = 1023;

/// Seed used by `verify` so failures are reproducible
pub const VERIFY_SEED: u64 = 0x5eed;

/// Trait that all algorithm benchmarkers must implement
pub trait AlgorithmRunner: Send + Sync {
    /// Name of the algorithm (e.g., "dot_product")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Category (e.g., "reduction", "elementwise")
    fn category(&self) -> &'static str;

    /// Names of the registered strategies, baseline first
    fn available_variants(&self) -> Vec<&'static str>;

    /// One runnable variant per strategy, all reading the same inputs.
    fn get_variants<'a>(&'a self, inputs: &'a VectorPair) -> Vec<Variant<'a>>;

    /// Verify every strategy against the sequential baseline.
    fn verify(&self) -> Result<()>;
}

/// Compare a strategy result against the baseline with relative tolerance.
pub fn check_close(variant: &str, expected: f64, got: f64) -> Result<()> {
    let diff = (got - expected).abs();
    if diff > VERIFY_TOLERANCE * expected.abs().max(1.0) || got.is_nan() {
        return Err(BenchError::Verification {
            variant: variant.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Global registry of all algorithms
pub struct AlgorithmRegistry {
    algorithms: Vec<Box<dyn AlgorithmRunner>>,
}

impl AlgorithmRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Register an algorithm
    pub fn register<A: AlgorithmRunner + 'static>(&mut self, algo: A) {
        self.algorithms.push(Box::new(algo));
    }

    /// Get all registered algorithms
    pub fn all(&self) -> &[Box<dyn AlgorithmRunner>] {
        &self.algorithms
    }

    /// Find algorithm by name
    pub fn find(&self, name: &str) -> Option<&dyn AlgorithmRunner> {
        self.algorithms
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    /// List algorithm names
    pub fn list_names(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(|a| a.name()).collect()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default registry with all algorithms.
///
/// # Errors
/// A precondition violation if `workers` is zero.
pub fn build_registry(workers: usize, device: Arc<dyn Accelerator>) -> Result<AlgorithmRegistry> {
    let mut registry = AlgorithmRegistry::new();

    registry.register(crate::math::dot_product::DotProductRunner::new(workers, Arc::clone(&device))?);
    registry.register(crate::math::vector_add::VectorAddRunner::new(workers, device)?);

    Ok(registry)
}
