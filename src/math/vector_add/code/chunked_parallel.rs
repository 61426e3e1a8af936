//! Multi-threaded vector add. Each worker produces the output for its
//! chunk; the pieces are concatenated in chunk order after the join.

use super::sequential::add_unchecked;
use super::ElementwiseStrategy;
use crate::error::{ensure_same_len, BenchError, Result};
use crate::parallel::{run_chunked, ChunkPartitioner};

/// # Errors
/// - Precondition violation for mismatched lengths or zero workers.
/// - Worker failure if any chunk fails.
pub fn vector_add_chunked(a: &[f32], b: &[f32], workers: usize) -> Result<Vec<f32>> {
    let partitioner = ChunkPartitioner::new(workers)?;
    add_chunked(a, b, &partitioner)
}

fn add_chunked(a: &[f32], b: &[f32], partitioner: &ChunkPartitioner) -> Result<Vec<f32>> {
    ensure_same_len(a, b)?;
    if a.is_empty() {
        return Ok(Vec::new());
    }

    let pieces = run_chunked(a.len(), partitioner, |chunk| {
        match (a.get(chunk.range()), b.get(chunk.range())) {
            (Some(xs), Some(ys)) => Ok(add_unchecked(xs, ys)),
            _ => Err(BenchError::worker(chunk.index, "chunk outside input")),
        }
    })?;
    pieces.concat()
}

pub struct ChunkedParallelAdd {
    partitioner: ChunkPartitioner,
}

impl ChunkedParallelAdd {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            partitioner: ChunkPartitioner::new(workers)?,
        })
    }
}

impl ElementwiseStrategy for ChunkedParallelAdd {
    fn name(&self) -> &'static str {
        "chunked_parallel"
    }

    fn description(&self) -> &'static str {
        "Fork-join over contiguous chunks, outputs concatenated in chunk order"
    }

    fn apply(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        add_chunked(a, b, &self.partitioner)
    }
}
