//! Utility modules for benchmarking and execution.

pub mod bench;
pub mod generator;
pub mod runner;
pub mod timer;
pub mod tui;

// Re-export commonly used items
pub use bench::{export_csv, format_duration, time_seed, RawTimingData};
pub use generator::{VectorGenerator, VectorPair};
pub use timer::{
    calculate_median, measure_variants, run_once, with_timing, Timing, TimingConfig, Variant, VariantResult,
};
