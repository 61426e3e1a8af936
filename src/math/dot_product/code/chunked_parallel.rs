//! Multi-threaded dot product over contiguous chunks.
//!
//! The input range is split by [`ChunkPartitioner`], one scoped thread
//! computes the local sum of each chunk, and the partial sums are added in
//! chunk order once every worker has joined. Inputs are only ever read, and
//! each worker owns its result slot, so no lock is involved.

use super::sequential::dot_unchecked;
use super::ReductionStrategy;
use crate::error::{ensure_same_len, BenchError, Result};
use crate::parallel::{run_chunked, Chunk, ChunkPartitioner};

/// Compute the dot product with `workers` parallel chunks.
///
/// # Errors
/// - Precondition violation for mismatched lengths or zero workers,
///   raised before any thread starts.
/// - Worker failure if any chunk fails.
pub fn dot_product_chunked(a: &[f32], b: &[f32], workers: usize) -> Result<f32> {
    let partitioner = ChunkPartitioner::new(workers)?;
    reduce_chunked(a, b, &partitioner)
}

fn reduce_chunked(a: &[f32], b: &[f32], partitioner: &ChunkPartitioner) -> Result<f32> {
    ensure_same_len(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }

    let partials = run_chunked(a.len(), partitioner, |chunk| chunk_dot(a, b, chunk))?;
    partials.sum()
}

/// Local sum over one chunk.
fn chunk_dot(a: &[f32], b: &[f32], chunk: Chunk) -> Result<f32> {
    match (a.get(chunk.range()), b.get(chunk.range())) {
        (Some(xs), Some(ys)) => Ok(dot_unchecked(xs, ys)),
        _ => Err(BenchError::worker(
            chunk.index,
            format!("range {:?} outside input of length {}", chunk.range(), a.len()),
        )),
    }
}

pub struct ChunkedParallel {
    partitioner: ChunkPartitioner,
}

impl ChunkedParallel {
    /// # Errors
    /// A precondition violation if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            partitioner: ChunkPartitioner::new(workers)?,
        })
    }

    pub fn workers(&self) -> usize {
        self.partitioner.workers()
    }
}

impl ReductionStrategy for ChunkedParallel {
    fn name(&self) -> &'static str {
        "chunked_parallel"
    }

    fn description(&self) -> &'static str {
        "Fork-join over contiguous chunks, partials merged in chunk order"
    }

    fn reduce(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        reduce_chunked(a, b, &self.partitioner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_out_of_range_is_worker_failure() {
        let chunk = Chunk {
            index: 3,
            start: 2,
            end: 6,
        };
        let err = chunk_dot(&[1.0; 4], &[1.0; 4], chunk).unwrap_err();
        assert!(matches!(err, BenchError::Worker { chunk: 3, .. }));
    }

    #[test]
    fn test_partials_of_concrete_scenario() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let chunks = ChunkPartitioner::new(2).unwrap().partition(4);
        let partials: Vec<f32> = chunks.iter().map(|&c| chunk_dot(&a, &b, c).unwrap()).collect();
        assert_eq!(partials, vec![17.0, 53.0]);
    }
}
