//! Seeded Gaussian blobs for benchmarking.
//!
//! Centroids sit evenly on a circle in the first two dimensions; any further
//! dimensions get small seeded offsets. Points are assigned to centroids in
//! round-robin order, so ground-truth labels are deterministic.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tiscan_core::{PointSet, TiscanError};

/// Errors raised while generating blobs.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum BlobError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// The requested cluster count was zero.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
    /// A floating-point parameter was negative or not finite.
    #[error("`{parameter}` must be finite and non-negative, got {value}")]
    InvalidFloat {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The generated rows were rejected by the point set.
    #[error(transparent)]
    Core(#[from] TiscanError),
}

/// Configuration for [`generate_blobs`].
#[derive(Clone, Debug)]
pub struct BlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each point.
    pub dimensions: usize,
    /// Number of blobs.
    pub cluster_count: usize,
    /// Radius of the circle the centroids sit on.
    pub separation: f64,
    /// Standard deviation of each blob along every axis.
    pub spread: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl BlobConfig {
    fn validate(&self) -> Result<(), BlobError> {
        if self.point_count == 0 {
            return Err(BlobError::ZeroPoints);
        }
        if self.dimensions == 0 {
            return Err(BlobError::ZeroDimensions);
        }
        if self.cluster_count == 0 {
            return Err(BlobError::ZeroClusters);
        }
        for (parameter, value) in [("separation", self.separation), ("spread", self.spread)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BlobError::InvalidFloat { parameter, value });
            }
        }
        Ok(())
    }
}

fn centroids(config: &BlobConfig, rng: &mut SmallRng) -> Vec<Vec<f64>> {
    (0..config.cluster_count)
        .map(|cluster| {
            let angle = cluster as f64 / config.cluster_count as f64 * TAU;
            let mut centroid = vec![0.0; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            let jitter = 0.2 * config.separation;
            for value in centroid.iter_mut().skip(2) {
                *value = if jitter > 0.0 {
                    rng.gen_range(-jitter..jitter)
                } else {
                    0.0
                };
            }
            centroid
        })
        .collect()
}

/// Box–Muller draw from the standard normal distribution.
fn standard_normal(rng: &mut SmallRng) -> f64 {
    let u1 = rng.gen_range(f64::EPSILON..1.0);
    let u2 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Generates blobs and their ground-truth labels.
///
/// # Errors
/// Returns [`BlobError`] when the configuration is invalid.
///
/// # Examples
/// ```
/// use tiscan_benches::blobs::{BlobConfig, generate_blobs};
///
/// let config = BlobConfig {
///     point_count: 30,
///     dimensions: 3,
///     cluster_count: 3,
///     separation: 10.0,
///     spread: 0.5,
///     seed: 42,
/// };
/// let (points, labels) = generate_blobs(&config).expect("valid config");
/// assert_eq!(points.len(), 30);
/// assert_eq!(&labels[..4], &[0, 1, 2, 0]);
/// ```
pub fn generate_blobs(config: &BlobConfig) -> Result<(PointSet, Vec<u64>), BlobError> {
    config.validate()?;
    let centres = centroids(config, &mut SmallRng::seed_from_u64(config.seed));
    let mut rng = SmallRng::seed_from_u64(config.seed ^ 0xA5A5_A5A5_A5A5_A5A5);

    let mut rows = Vec::with_capacity(config.point_count);
    let mut labels = Vec::with_capacity(config.point_count);
    for (label, centre) in (0u64..).zip(centres.iter()).cycle().take(config.point_count) {
        labels.push(label);
        rows.push(
            centre
                .iter()
                .map(|value| value + config.spread * standard_normal(&mut rng))
                .collect(),
        );
    }
    Ok((PointSet::new(config.dimensions, rows)?, labels))
}
