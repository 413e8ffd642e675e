//! Parameter labels shown in Criterion benchmark ids.

use std::fmt;

/// Dataset shape of a neighbour-search benchmark.
#[derive(Clone, Copy, Debug)]
pub struct SearchBenchParams {
    /// Number of points.
    pub point_count: usize,
    /// Coordinates per point.
    pub dimensions: usize,
}

impl fmt::Display for SearchBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},d={}", self.point_count, self.dimensions)
    }
}

/// Dataset size and algorithm of an end-to-end clustering benchmark.
#[derive(Clone, Copy, Debug)]
pub struct PipelineBenchParams {
    /// Number of points.
    pub point_count: usize,
    /// Short algorithm name.
    pub algorithm: &'static str,
}

impl fmt::Display for PipelineBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},n={}", self.algorithm, self.point_count)
    }
}
