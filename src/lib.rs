//! # Reduction-Bench
//!
//! Micro-benchmark harness comparing a sequential loop, a chunked
//! fork-join over CPU workers and a compute-device offload for the same
//! vector computation.
//!
//! ```
//! use reduction_bench::prelude::*;
//!
//! let inputs = VectorGenerator::new(42).pair(1000);
//! let expected = dot_product::dot_product_sequential(inputs.a(), inputs.b()).unwrap();
//! let parallel = dot_product::dot_product_chunked(inputs.a(), inputs.b(), 8).unwrap();
//! assert!((expected - parallel).abs() <= 1e-4 * expected.abs());
//! ```

pub mod accel;
pub mod cli;
pub mod config;
pub mod error;
pub mod math;
pub mod parallel;
pub mod registry;
pub mod utils;

pub use error::{BenchError, PreconditionViolation, Result};

/// Re-export tui from utils
pub use utils::tui;

pub use utils::runner::run;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::accel::{Accelerator, SoftwareDevice};
    pub use crate::config::{Backend, BenchConfig};
    pub use crate::error::{BenchError, Result};
    pub use crate::math::{dot_product, vector_add};
    pub use crate::parallel::{Aggregator, ChunkPartitioner};
    pub use crate::registry::{build_registry, AlgorithmRegistry, AlgorithmRunner};
    pub use crate::utils::{VectorGenerator, VectorPair};
}
