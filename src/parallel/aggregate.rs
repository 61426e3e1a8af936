//! Order-preserving collection of per-chunk partial results.
//!
//! Each chunk owns exactly one pre-allocated slot, so workers write
//! without locking and the merge order never depends on which worker
//! finished first.

use crate::error::{BenchError, Result};
use std::slice::IterMut;

/// Partial sum computed by the worker that owned `chunk`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartialResult {
    pub chunk: usize,
    pub value: f32,
}

/// Fixed-size arena of per-chunk slots.
#[derive(Debug)]
pub struct Aggregator<T> {
    slots: Vec<Option<T>>,
}

impl<T> Aggregator<T> {
    /// One empty slot per chunk
    pub fn with_chunks(chunks: usize) -> Self {
        Self {
            slots: (0..chunks).map(|_| None).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that already hold a value.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Exclusive mutable access to every slot, in chunk order.
    ///
    /// Handing one `&mut` slot to each worker is what makes concurrent
    /// insertion contention-free.
    pub fn slots_mut(&mut self) -> IterMut<'_, Option<T>> {
        self.slots.iter_mut()
    }

    /// Store the value for `chunk`.
    ///
    /// # Errors
    /// A worker failure if the index is out of range or already filled.
    pub fn insert(&mut self, chunk: usize, value: T) -> Result<()> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(chunk).ok_or_else(|| {
            BenchError::worker(chunk, format!("chunk index out of range (have {})", len))
        })?;
        if slot.is_some() {
            return Err(BenchError::worker(chunk, "partial result produced twice"));
        }
        *slot = Some(value);
        Ok(())
    }

    /// Consume the aggregator, yielding values in ascending chunk order.
    ///
    /// # Errors
    /// A worker failure naming the first chunk that never reported.
    pub fn into_ordered(self) -> Result<Vec<T>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(chunk, slot)| {
                slot.ok_or_else(|| BenchError::worker(chunk, "no partial result recorded"))
            })
            .collect()
    }
}

impl Aggregator<f32> {
    /// Collect an unordered stream of partials keyed by chunk index.
    pub fn from_partials<I>(chunks: usize, partials: I) -> Result<Self>
    where
        I: IntoIterator<Item = PartialResult>,
    {
        let mut aggregator = Self::with_chunks(chunks);
        for partial in partials {
            aggregator.insert(partial.chunk, partial.value)?;
        }
        Ok(aggregator)
    }

    /// Sum the partials in ascending chunk order; `0.0` when empty.
    pub fn sum(self) -> Result<f32> {
        Ok(self.into_ordered()?.into_iter().fold(0.0, |acc, v| acc + v))
    }
}

impl<T> Aggregator<Vec<T>> {
    /// Join per-chunk outputs back into one vector, in chunk order.
    pub fn concat(self) -> Result<Vec<T>> {
        let parts = self.into_ordered()?;
        let mut out = Vec::with_capacity(parts.iter().map(Vec::len).sum());
        for part in parts {
            out.extend(part);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sums_to_zero() {
        let agg: Aggregator<f32> = Aggregator::with_chunks(0);
        assert!(agg.is_empty());
        assert_eq!(agg.sum().unwrap(), 0.0);
    }

    #[test]
    fn test_sum_independent_of_insert_order() {
        let partials = [
            PartialResult { chunk: 1, value: 53.0 },
            PartialResult { chunk: 0, value: 17.0 },
        ];
        let agg = Aggregator::from_partials(2, partials).unwrap();
        assert_eq!(agg.sum().unwrap(), 70.0);
    }

    #[test]
    fn test_merge_order_is_chunk_order() {
        // Values chosen so that float addition order changes the result
        let values = [1.0e8_f32, 1.0, -1.0e8, 1.0];
        let forward = Aggregator::from_partials(
            4,
            values
                .iter()
                .enumerate()
                .map(|(chunk, &value)| PartialResult { chunk, value }),
        )
        .unwrap();
        let reversed = Aggregator::from_partials(
            4,
            values
                .iter()
                .enumerate()
                .rev()
                .map(|(chunk, &value)| PartialResult { chunk, value }),
        )
        .unwrap();

        let expected = values.iter().fold(0.0_f32, |acc, v| acc + v);
        assert_eq!(forward.sum().unwrap().to_bits(), expected.to_bits());
        assert_eq!(reversed.sum().unwrap().to_bits(), expected.to_bits());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut agg = Aggregator::with_chunks(2);
        agg.insert(0, 1.0_f32).unwrap();
        assert!(matches!(
            agg.insert(0, 2.0),
            Err(BenchError::Worker { chunk: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_range_insert_rejected() {
        let mut agg = Aggregator::with_chunks(2);
        assert!(matches!(
            agg.insert(5, 1.0_f32),
            Err(BenchError::Worker { chunk: 5, .. })
        ));
    }

    #[test]
    fn test_missing_slot_reported() {
        let mut agg = Aggregator::with_chunks(3);
        agg.insert(0, 1.0_f32).unwrap();
        agg.insert(2, 1.0_f32).unwrap();
        assert_eq!(agg.filled(), 2);
        assert!(matches!(agg.sum(), Err(BenchError::Worker { chunk: 1, .. })));
    }

    #[test]
    fn test_slots_mut_exclusive_per_chunk() {
        let mut agg: Aggregator<f32> = Aggregator::with_chunks(3);
        for (i, slot) in agg.slots_mut().enumerate() {
            *slot = Some(i as f32);
        }
        assert_eq!(agg.into_ordered().unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_concat_follows_chunk_order() {
        let mut agg: Aggregator<Vec<u32>> = Aggregator::with_chunks(3);
        agg.insert(2, vec![5]).unwrap();
        agg.insert(0, vec![1, 2]).unwrap();
        agg.insert(1, vec![3, 4]).unwrap();
        assert_eq!(agg.concat().unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
