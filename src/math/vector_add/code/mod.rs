//! Vector add implementations.

mod accelerator;
mod chunked_parallel;
mod sequential;

pub use accelerator::AcceleratorAdd;
pub use chunked_parallel::{vector_add_chunked, ChunkedParallelAdd};
pub use sequential::{vector_add_sequential, SequentialAdd};

use crate::accel::Accelerator;
use crate::error::Result;
use std::sync::Arc;

/// A way of computing `out[i] = a[i] + b[i]`.
pub trait ElementwiseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Produce the elementwise sum; empty inputs give an empty output.
    fn apply(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;
}

/// Index-order sum of an output vector, used as the benchmark result sample.
pub fn checksum(values: &[f32]) -> f32 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

/// All strategies, baseline first.
///
/// # Errors
/// A precondition violation if `workers` is zero.
pub fn available_variants(workers: usize, device: Arc<dyn Accelerator>) -> Result<Vec<Box<dyn ElementwiseStrategy>>> {
    Ok(vec![
        Box::new(SequentialAdd),
        Box::new(ChunkedParallelAdd::new(workers)?),
        Box::new(AcceleratorAdd::new(device)),
    ])
}
