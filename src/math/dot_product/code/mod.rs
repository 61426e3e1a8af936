//! Dot product implementations.
//!
//! This module contains all execution strategies of the dot product.

mod accelerator;
mod chunked_parallel;
mod sequential;

pub use accelerator::AcceleratorReduction;
pub use chunked_parallel::{dot_product_chunked, ChunkedParallel};
pub use sequential::{dot_product_sequential, Sequential};

use crate::accel::Accelerator;
use crate::error::Result;
use std::sync::Arc;

/// A way of computing `Σ a[i] * b[i]` over two equal-length vectors.
pub trait ReductionStrategy: Send + Sync {
    /// Name of this strategy, as printed in reports
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Compute the dot product.
    ///
    /// Implementations reject mismatched lengths before doing any work and
    /// return `0.0` for empty inputs.
    fn reduce(&self, a: &[f32], b: &[f32]) -> Result<f32>;
}

/// All strategies, baseline first.
///
/// # Errors
/// A precondition violation if `workers` is zero.
pub fn available_variants(workers: usize, device: Arc<dyn Accelerator>) -> Result<Vec<Box<dyn ReductionStrategy>>> {
    Ok(vec![
        Box::new(Sequential),
        Box::new(ChunkedParallel::new(workers)?),
        Box::new(AcceleratorReduction::new(device)),
    ])
}
