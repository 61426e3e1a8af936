//! Chunked fork-join building blocks shared by the parallel variants.

pub mod aggregate;
pub mod fork_join;
pub mod partition;

pub use aggregate::{Aggregator, PartialResult};
pub use fork_join::run_chunked;
pub use partition::{Chunk, ChunkPartitioner};
