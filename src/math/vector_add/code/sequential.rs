use super::ElementwiseStrategy;
use crate::error::{ensure_same_len, Result};

/// Add two vectors element by element on the calling thread.
///
/// # Errors
/// A precondition violation if the vectors have different lengths.
pub fn vector_add_sequential(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    ensure_same_len(a, b)?;
    Ok(add_unchecked(a, b))
}

#[inline]
pub(crate) fn add_unchecked(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub struct SequentialAdd;

impl ElementwiseStrategy for SequentialAdd {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn description(&self) -> &'static str {
        "Single-threaded loop, the correctness baseline"
    }

    fn apply(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        vector_add_sequential(a, b)
    }
}
