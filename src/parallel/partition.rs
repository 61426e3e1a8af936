//! Splitting an index range into contiguous per-worker chunks.

use crate::error::{PreconditionViolation, Result};
use std::ops::Range;

/// A contiguous half-open range `[start, end)` assigned to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in its partition
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits `[0, size)` into at most `workers` contiguous chunks.
///
/// The chunk length is `ceil(size / workers)` with the last chunk
/// truncated to `size`. Asking for more workers than elements clamps the
/// worker count to `size`, so no chunk is ever empty.
///
/// # Example
/// ```
/// use reduction_bench::parallel::ChunkPartitioner;
///
/// let chunks = ChunkPartitioner::new(2).unwrap().partition(4);
/// assert_eq!(chunks[0].range(), 0..2);
/// assert_eq!(chunks[1].range(), 2..4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPartitioner {
    workers: usize,
}

impl ChunkPartitioner {
    /// Create a partitioner for the requested parallelism.
    ///
    /// # Errors
    /// [`PreconditionViolation::NoWorkers`] if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(PreconditionViolation::NoWorkers.into());
        }
        Ok(Self { workers })
    }

    /// Requested worker count
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Worker count actually used for a vector of `size` elements.
    pub fn effective_workers(&self, size: usize) -> usize {
        self.workers.min(size)
    }

    /// Length of every chunk but (possibly) the last one.
    pub fn chunk_len(&self, size: usize) -> usize {
        match self.effective_workers(size) {
            0 => 0,
            workers => size.div_ceil(workers),
        }
    }

    /// Produce the ordered chunk list covering `[0, size)`.
    pub fn partition(&self, size: usize) -> Vec<Chunk> {
        let chunk_len = self.chunk_len(size);
        if chunk_len == 0 {
            return Vec::new();
        }

        // Ceil division can leave trailing workers with nothing to do
        // (e.g. 10 elements over 6 workers); those chunks are not emitted.
        let chunks: Vec<Chunk> = (0..self.effective_workers(size))
            .map(|index| (index, index * chunk_len))
            .take_while(|&(_, start)| start < size)
            .map(|(index, start)| Chunk {
                index,
                start,
                end: (start + chunk_len).min(size),
            })
            .collect();

        log::trace!(
            "partitioned {} elements into {} chunks of up to {}",
            size,
            chunks.len(),
            chunk_len
        );
        chunks
    }
}
