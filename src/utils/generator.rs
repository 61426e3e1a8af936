//! Reproducible benchmark inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Values are drawn from `[0, DEFAULT_SCALE)`
pub const DEFAULT_SCALE: f32 = 10.0;

/// Two equal-length input vectors, immutable once generated.
///
/// Cloning shares the underlying storage; no strategy can mutate it.
#[derive(Clone, Debug)]
pub struct VectorPair {
    a: Arc<[f32]>,
    b: Arc<[f32]>,
}

impl VectorPair {
    /// Wrap existing data.
    ///
    /// Lengths are not checked here; strategies reject mismatched pairs.
    pub fn new(a: Vec<f32>, b: Vec<f32>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn a(&self) -> &[f32] {
        &self.a
    }

    pub fn b(&self) -> &[f32] {
        &self.b
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Seeded generator of pseudo-random `f32` vectors.
pub struct VectorGenerator {
    rng: StdRng,
    scale: f32,
}

impl VectorGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            scale: DEFAULT_SCALE,
        }
    }

    /// Draw values from `[0, scale)` instead of the default range.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn vector(&mut self, len: usize) -> Vec<f32> {
        let scale = self.scale;
        (0..len).map(|_| self.rng.random::<f32>() * scale).collect()
    }

    /// Generate both inputs for one benchmark run.
    pub fn pair(&mut self, len: usize) -> VectorPair {
        let a = self.vector(len);
        let b = self.vector(len);
        VectorPair::new(a, b)
    }
}
