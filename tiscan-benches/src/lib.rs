//! Benchmark support crate for tiscan.
//!
//! Provides seeded synthetic datasets and parameter labels for the Criterion
//! benchmarks comparing brute-force and pruned neighbour search and timing
//! both clustering variants end to end.

pub mod blobs;
pub mod params;
