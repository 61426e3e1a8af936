//! Fork-join execution of per-chunk work on scoped threads.

use super::aggregate::Aggregator;
use super::partition::{Chunk, ChunkPartitioner};
use crate::error::{BenchError, Result};
use std::any::Any;
use std::io;
use std::thread;

/// Run `work` once per chunk of `[0, size)`, one scoped thread per chunk.
///
/// Every worker writes into its own slot of the returned [`Aggregator`].
/// The coordinator blocks only on the join barrier. When several workers
/// fail, the error of the lowest chunk index is returned; a panicking
/// worker, or one the OS refuses to start, is reported as a worker
/// failure rather than unwinding into the caller.
///
/// An empty range launches no threads and yields an empty aggregator.
pub fn run_chunked<T, F>(size: usize, partitioner: &ChunkPartitioner, work: F) -> Result<Aggregator<T>>
where
    T: Send,
    F: Fn(Chunk) -> Result<T> + Sync,
{
    run_chunked_with(size, partitioner, work, |_| Ok(()))
}

/// [`run_chunked`] with a check that runs right before each spawn.
///
/// An error from `before_spawn` is handled exactly like a failed thread
/// creation: no further workers start, the running ones are joined, and
/// the chunk is reported as failed.
pub(crate) fn run_chunked_with<T, F, G>(
    size: usize,
    partitioner: &ChunkPartitioner,
    work: F,
    before_spawn: G,
) -> Result<Aggregator<T>>
where
    T: Send,
    F: Fn(Chunk) -> Result<T> + Sync,
    G: Fn(Chunk) -> io::Result<()>,
{
    let chunks = partitioner.partition(size);
    let mut aggregator = Aggregator::with_chunks(chunks.len());
    if chunks.is_empty() {
        return Ok(aggregator);
    }

    log::debug!(
        "forking {} workers over {} elements (requested {})",
        chunks.len(),
        size,
        partitioner.workers()
    );

    let work = &work;
    let first_failure = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(chunks.len());
        let mut spawn_failure = None;
        for (slot, chunk) in aggregator.slots_mut().zip(chunks.iter().copied()) {
            let spawned = before_spawn(chunk).and_then(|()| {
                thread::Builder::new().spawn_scoped(scope, move || -> Result<()> {
                    *slot = Some(work(chunk)?);
                    Ok(())
                })
            });
            match spawned {
                Ok(handle) => handles.push((chunk.index, handle)),
                Err(e) => {
                    log::warn!("could not start worker for chunk {}: {}", chunk.index, e);
                    spawn_failure = Some(BenchError::worker(
                        chunk.index,
                        format!("failed to spawn worker thread: {}", e),
                    ));
                    break;
                }
            }
        }

        // Join every started handle so no panic escapes the scope. They all
        // precede the chunk that failed to spawn.
        let mut first_failure = None;
        for (index, handle) in handles {
            let outcome = match handle.join() {
                Ok(outcome) => outcome,
                Err(payload) => Err(BenchError::worker(index, panic_message(payload.as_ref()))),
            };
            if let Err(err) = outcome {
                log::debug!("worker {} failed: {}", index, err);
                first_failure.get_or_insert(err);
            }
        }
        first_failure.or(spawn_failure)
    });

    match first_failure {
        Some(err) => Err(err),
        None => Ok(aggregator),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", msg)
    } else {
        "worker panicked".to_string()
    }
}
