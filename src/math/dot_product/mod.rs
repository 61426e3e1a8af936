//! # Dot Product Algorithm
//!
//! Sum of products of corresponding elements in two vectors:
//!
//! `dot(a, b) = Σ(a[i] * b[i])`
//!
//! ## Strategies
//!
//! - **Sequential**: one loop on the calling thread, the reference result
//! - **Chunked parallel**: contiguous chunks reduced by scoped worker threads
//! - **Accelerator**: products computed by a compute device, summed on the host

pub mod code;
pub mod test;

pub use code::*;

use crate::accel::Accelerator;
use crate::error::Result;
use crate::registry::{check_close, AlgorithmRunner, VERIFY_SEED, VERIFY_SIZE};
use crate::utils::generator::{VectorGenerator, VectorPair};
use crate::utils::timer::Variant;
use std::hint::black_box;
use std::sync::Arc;

/// Runner for the dot product algorithm
pub struct DotProductRunner {
    strategies: Vec<Box<dyn ReductionStrategy>>,
}

impl DotProductRunner {
    /// # Errors
    /// A precondition violation if `workers` is zero.
    pub fn new(workers: usize, device: Arc<dyn Accelerator>) -> Result<Self> {
        Ok(Self {
            strategies: code::available_variants(workers, device)?,
        })
    }
}

impl AlgorithmRunner for DotProductRunner {
    fn name(&self) -> &'static str {
        "dot_product"
    }

    fn description(&self) -> &'static str {
        "Computes the sum of products of corresponding vector elements"
    }

    fn category(&self) -> &'static str {
        "reduction"
    }

    fn available_variants(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn get_variants<'a>(&'a self, inputs: &'a VectorPair) -> Vec<Variant<'a>> {
        self.strategies
            .iter()
            .map(|strategy| Variant {
                name: strategy.name(),
                description: strategy.description(),
                run: Box::new(move || {
                    let result = strategy.reduce(inputs.a(), inputs.b())?;
                    Ok(Some(black_box(result) as f64))
                }),
            })
            .collect()
    }

    fn verify(&self) -> Result<()> {
        // Non-aligned size so the last chunk is short
        let inputs = VectorGenerator::new(VERIFY_SEED).pair(VERIFY_SIZE);
        let expected = dot_product_sequential(inputs.a(), inputs.b())? as f64;

        for strategy in &self.strategies {
            let got = strategy.reduce(inputs.a(), inputs.b())?;
            check_close(strategy.name(), expected, got as f64)?;

            let empty = strategy.reduce(&[], &[])?;
            check_close(strategy.name(), 0.0, empty as f64)?;
        }

        Ok(())
    }
}
