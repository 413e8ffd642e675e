//! Density-based cluster expansion.
//!
//! [`run_clustering`] turns the neighbour relations left on a [`PointSet`] by
//! [`crate::run_neighbour_search`] into cluster labels and point roles.

mod epsilon;
mod neighbour_count;
mod worklist;

use std::{f64::consts::FRAC_2_PI, fmt};

use tracing::{Span, info, instrument};

use crate::{
    error::{Result, TiscanError},
    labels::ClusterLabeling,
    neighbours::NeighbourQuery,
    point::PointSet,
};

/// Multiplier applied to `k` to decide whether a reverse-neighbour list is
/// dense enough to pull its members into the expanding cluster.
pub const DENSITY_FACTOR: f64 = FRAC_2_PI;

/// Family of clustering algorithm, without parameters.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AlgorithmKind {
    /// Epsilon-radius density reachability.
    #[default]
    Epsilon,
    /// Reverse-nearest-neighbour density.
    NeighbourCount,
}

impl AlgorithmKind {
    /// Returns the conventional short name of the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Epsilon => "dbscan",
            Self::NeighbourCount => "dbscrn",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clustering algorithm together with its density parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Algorithm {
    /// Core points have at least `min_pts` points, themselves included, in
    /// their epsilon-neighbourhood.
    Epsilon {
        /// Minimum neighbourhood size of a core point.
        min_pts: usize,
    },
    /// Core points appear in the nearest-neighbour lists of at least `k`
    /// other points.
    NeighbourCount {
        /// Minimum reverse-neighbour count of a core point.
        k: usize,
        /// Pull threshold multiplier; see [`DENSITY_FACTOR`].
        density_factor: f64,
    },
}

impl Algorithm {
    /// Reverse-neighbour clustering with the default [`DENSITY_FACTOR`].
    #[must_use]
    pub const fn neighbour_count(k: usize) -> Self {
        Self::NeighbourCount {
            k,
            density_factor: DENSITY_FACTOR,
        }
    }

    /// Returns the algorithm family.
    #[must_use]
    pub const fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Epsilon { .. } => AlgorithmKind::Epsilon,
            Self::NeighbourCount { .. } => AlgorithmKind::NeighbourCount,
        }
    }

    /// Checks the density parameters.
    ///
    /// # Errors
    /// Returns [`TiscanError::InvalidMinPts`], [`TiscanError::InvalidK`] or
    /// [`TiscanError::InvalidDensityFactor`] for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Epsilon { min_pts } if min_pts == 0 => {
                Err(TiscanError::InvalidMinPts { got: min_pts })
            }
            Self::NeighbourCount { k, .. } if k == 0 => Err(TiscanError::InvalidK { got: k }),
            Self::NeighbourCount { density_factor, .. }
                if !density_factor.is_finite() || density_factor < 0.0 =>
            {
                Err(TiscanError::InvalidDensityFactor {
                    got: density_factor,
                })
            }
            _ => Ok(()),
        }
    }

    fn ensure_neighbours(&self, points: &PointSet) -> Result<()> {
        match (self, points.last_query()) {
            (Self::Epsilon { .. }, Some(NeighbourQuery::Epsilon { .. }))
            | (Self::NeighbourCount { .. }, Some(NeighbourQuery::Knn { .. })) => Ok(()),
            (Self::Epsilon { .. }, _) => Err(TiscanError::MissingNeighbours {
                required: "epsilon neighbourhoods",
            }),
            (Self::NeighbourCount { .. }, _) => Err(TiscanError::MissingNeighbours {
                required: "k-nearest neighbours",
            }),
        }
    }
}

/// Assigns every point a cluster label and a [`crate::PointRole`].
///
/// The epsilon variant consumes epsilon-neighbourhoods and the
/// neighbour-count variant consumes nearest and reverse-nearest neighbours,
/// so the matching [`crate::run_neighbour_search`] must run first. Roles from
/// any earlier clustering are discarded, and repeated runs over the same
/// relations produce identical labels.
///
/// # Errors
/// Returns the parameter errors of [`Algorithm::validate`] and
/// [`TiscanError::MissingNeighbours`] when the required relation is absent.
///
/// # Examples
/// ```
/// use tiscan_core::{
///     Algorithm, ClusterId, Minkowski, NeighbourQuery, PointSet, SearchMode,
///     run_clustering, run_neighbour_search,
/// };
///
/// let mut points = PointSet::new(1, vec![vec![0.0], vec![0.5], vec![1.0], vec![9.0]])?;
/// run_neighbour_search(
///     &mut points,
///     SearchMode::Pruned,
///     NeighbourQuery::Epsilon { eps: 0.6 },
///     &Minkowski::EUCLIDEAN,
/// )?;
/// let labels = run_clustering(&mut points, Algorithm::Epsilon { min_pts: 2 })?;
/// assert_eq!(labels.cluster_count(), 1);
/// assert_eq!(labels.get(3), Some(ClusterId::NOISE));
/// # Ok::<(), tiscan_core::TiscanError>(())
/// ```
#[instrument(
    name = "core.cluster",
    err,
    skip(points),
    fields(
        points = points.len(),
        algorithm = %algorithm.kind(),
        clusters = tracing::field::Empty,
    ),
)]
pub fn run_clustering(points: &mut PointSet, algorithm: Algorithm) -> Result<ClusterLabeling> {
    algorithm.validate()?;
    algorithm.ensure_neighbours(points)?;
    points.reset_roles();

    let labels = match algorithm {
        Algorithm::Epsilon { min_pts } => epsilon::expand(points, min_pts),
        Algorithm::NeighbourCount { k, density_factor } => {
            neighbour_count::expand(points, k, density_factor)
        }
    };

    Span::current().record("clusters", labels.cluster_count());
    info!(
        clusters = labels.cluster_count(),
        noise = labels.noise_count(),
        "clustering completed"
    );
    Ok(labels)
}
