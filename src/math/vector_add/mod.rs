//! # Vector Add Algorithm
//!
//! Elementwise sum of two vectors: `out[i] = a[i] + b[i]`.
//!
//! Unlike the dot product there is no reduction step; the chunked variant
//! only has to put the per-chunk outputs back in order. Benchmarks report
//! the checksum `Σ out[i]` as their result sample.

pub mod code;
pub mod test;

pub use code::*;

use crate::accel::Accelerator;
use crate::error::{BenchError, Result};
use crate::registry::{check_close, AlgorithmRunner, VERIFY_SEED, VERIFY_SIZE};
use crate::utils::generator::{VectorGenerator, VectorPair};
use crate::utils::timer::Variant;
use std::hint::black_box;
use std::sync::Arc;

/// Runner for the vector add algorithm
pub struct VectorAddRunner {
    strategies: Vec<Box<dyn ElementwiseStrategy>>,
}

impl VectorAddRunner {
    pub fn new(workers: usize, device: Arc<dyn Accelerator>) -> Result<Self> {
        Ok(Self {
            strategies: code::available_variants(workers, device)?,
        })
    }
}

impl AlgorithmRunner for VectorAddRunner {
    fn name(&self) -> &'static str {
        "vector_add"
    }

    fn description(&self) -> &'static str {
        "Adds two vectors element by element"
    }

    fn category(&self) -> &'static str {
        "elementwise"
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
                    let out = black_box(strategy.apply(inputs.a(), inputs.b())?);
                    Ok(Some(checksum(&out) as f64))
                }),
            })
            .collect()
    }

    fn verify(&self) -> Result<()> {
        let inputs = VectorGenerator::new(VERIFY_SEED).pair(VERIFY_SIZE);
        let expected = vector_add_sequential(inputs.a(), inputs.b())?;

        for strategy in &self.strategies {
            let got = strategy.apply(inputs.a(), inputs.b())?;
            if got.len() != expected.len() {
                return Err(BenchError::Verification {
                    variant: strategy.name().to_string(),
                    expected: expected.len() as f64,
                    got: got.len() as f64,
                });
            }
            for (e, g) in expected.iter().zip(&got) {
                check_close(strategy.name(), *e as f64, *g as f64)?;
            }

            let empty = strategy.apply(&[], &[])?;
            if !empty.is_empty() {
                return Err(BenchError::Verification {
                    variant: strategy.name().to_string(),
                    expected: 0.0,
                    got: empty.len() as f64,
                });
            }
        }

        Ok(())
    }
}
