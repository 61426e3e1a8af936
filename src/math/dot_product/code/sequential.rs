//! Single-threaded reference implementation.

use super::ReductionStrategy;
use crate::error::{ensure_same_len, Result};

/// Compute the dot product of two vectors sequentially.
///
/// This is the baseline every other strategy is verified against.
/// Summation runs strictly in index order, so repeated calls on the same
/// inputs are bit-identical.
///
/// # Errors
/// A precondition violation if the vectors have different lengths.
///
/// # Example
/// ```
/// use reduction_bench::math::dot_product::dot_product_sequential;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let result = dot_product_sequential(&a, &b).unwrap();
/// assert!((result - 32.0).abs() < 1e-6);
/// ```
pub fn dot_product_sequential(a: &[f32], b: &[f32]) -> Result<f32> {
    ensure_same_len(a, b)?;
    Ok(dot_unchecked(a, b))
}

/// Index-order dot product of two slices of equal length.
#[inline]
pub(crate) fn dot_unchecked(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}

pub struct Sequential;

impl ReductionStrategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn description(&self) -> &'static str {
        "Single-threaded loop, the correctness baseline"
    }

    fn reduce(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        dot_product_sequential(a, b)
    }
}
