//! Error types shared by every strategy and the benchmark harness.

use crate::accel::AcceleratorError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = BenchError> = std::result::Result<T, E>;

/// Violated input contract, detected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    /// The two input vectors differ in length
    #[error("vector lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first vector
        left: usize,
        /// Length of the second vector
        right: usize,
    },

    /// A parallel strategy was asked to run with zero workers
    #[error("worker count must be at least 1")]
    NoWorkers,
}

/// Any failure surfaced by a benchmark strategy or the harness around it.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    /// A concurrent worker failed; fatal for the strategy invocation
    #[error("worker for chunk {chunk} failed: {reason}")]
    Worker { chunk: usize, reason: String },

    #[error("accelerator failure: {0}")]
    Accelerator(#[from] AcceleratorError),

    /// A strategy disagreed with the sequential baseline
    #[error("variant '{variant}' failed verification: expected {expected}, got {got}")]
    Verification { variant: String, expected: f64, got: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Build a worker failure for the given chunk.
    pub fn worker(chunk: usize, reason: impl Into<String>) -> Self {
        Self::Worker {
            chunk,
            reason: reason.into(),
        }
    }

    /// True when the error was raised before any work was launched.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Fail with [`PreconditionViolation::LengthMismatch`] unless both slices match.
pub fn ensure_same_len(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(PreconditionViolation::LengthMismatch {
            left: a.len(),
            right: b.len(),
        }
        .into());
    }
    Ok(())
}
