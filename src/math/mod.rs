//! Benchmarked algorithms.

pub mod dot_product;
pub mod vector_add;
