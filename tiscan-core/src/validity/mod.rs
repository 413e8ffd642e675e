//! Clustering validity metrics.
//!
//! [`compute_validity`] summarises a finished labelling: role and cluster
//! counts, the internal silhouette and Davies–Bouldin indices, and the Rand
//! index and purity when ground truth is supplied. Undefined values are
//! reported as `None`; no statistic is ever NaN.

mod davies_bouldin;
mod external;
mod silhouette;

use std::fmt;

use tracing::{info, instrument, warn};

use crate::{
    distance::Minkowski,
    error::{Result, TiscanError},
    labels::ClusterLabeling,
    point::{PointRole, PointSet},
};

pub use self::external::ExternalScores;

/// How the noise label takes part in the Davies–Bouldin index.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NoiseTreatment {
    /// Noise points are left out of the index.
    #[default]
    Exclude,
    /// Noise points form one additional cluster.
    IncludeAsCluster,
}

impl NoiseTreatment {
    /// Returns a stable lowercase name for the treatment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exclude => "exclude",
            Self::IncludeAsCluster => "include",
        }
    }
}

impl fmt::Display for NoiseTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`compute_validity`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidityOptions {
    /// Metric used for silhouette and centroid distances.
    pub metric: Minkowski,
    /// Davies–Bouldin noise handling.
    pub noise: NoiseTreatment,
    /// Whether to compute the quadratic-cost silhouette coefficient.
    pub silhouette: bool,
}

impl Default for ValidityOptions {
    fn default() -> Self {
        Self {
            metric: Minkowski::default(),
            noise: NoiseTreatment::default(),
            silhouette: true,
        }
    }
}

/// Number of points holding each [`PointRole`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RoleCounts {
    /// Core points.
    pub core: usize,
    /// Border points.
    pub border: usize,
    /// Non-core points reached during expansion.
    pub non_core: usize,
    /// Points with the noise role.
    pub noise: usize,
}

impl RoleCounts {
    fn tally(points: &PointSet) -> Self {
        points
            .points()
            .iter()
            .fold(Self::default(), |mut counts, point| {
                match point.role() {
                    PointRole::Core => counts.core += 1,
                    PointRole::Border => counts.border += 1,
                    PointRole::NonCore => counts.non_core += 1,
                    PointRole::Noise => counts.noise += 1,
                }
                counts
            })
    }
}

/// Read-only summary of a clustering run.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    /// Number of points.
    pub points: usize,
    /// Coordinates per point.
    pub dimensions: usize,
    /// Points per role.
    pub roles: RoleCounts,
    /// Number of non-noise clusters.
    pub clusters: usize,
    /// Points labelled as noise.
    pub noise: usize,
    /// Mean exact distance evaluations per point during neighbour search.
    pub mean_distance_evaluations: f64,
    /// Silhouette coefficient in `[-1, 1]`; `None` when skipped or undefined.
    pub silhouette: Option<f64>,
    /// Davies–Bouldin index, non-negative; `None` when undefined.
    pub davies_bouldin: Option<f64>,
    /// Ground-truth agreement, when labels were supplied.
    pub external: Option<ExternalScores>,
}

/// Scores `labels` for the points they were computed from.
///
/// # Errors
/// Returns [`TiscanError::EmptyDataset`] for an empty set and
/// [`TiscanError::LabelLengthMismatch`] when `labels` or `ground_truth` do
/// not cover exactly the points.
///
/// # Examples
/// ```
/// use tiscan_core::{ClusterId, ClusterLabeling, PointSet, ValidityOptions, compute_validity};
///
/// let points = PointSet::new(1, vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]])?;
/// let labels = ClusterLabeling::try_from_assignments(
///     [1, 1, 2, 2].into_iter().map(ClusterId::new).collect(),
/// )
/// .expect("contiguous ids");
/// let stats = compute_validity(&points, &labels, Some(&[7, 7, 9, 9][..]), &ValidityOptions::default())?;
/// assert_eq!(stats.clusters, 2);
/// assert_eq!(stats.external.map(|scores| scores.rand_index), Some(1.0));
/// # Ok::<(), tiscan_core::TiscanError>(())
/// ```
#[instrument(
    name = "core.validity",
    err,
    skip(points, labels, ground_truth, options),
    fields(
        points = points.len(),
        ground_truth = ground_truth.is_some(),
        noise_treatment = %options.noise,
    ),
)]
pub fn compute_validity(
    points: &PointSet,
    labels: &ClusterLabeling,
    ground_truth: Option<&[u64]>,
    options: &ValidityOptions,
) -> Result<Stats> {
    let len = points.len();
    if len == 0 {
        return Err(TiscanError::EmptyDataset);
    }
    if labels.len() != len {
        return Err(TiscanError::LabelLengthMismatch {
            what: "cluster labelling",
            expected: len,
            found: labels.len(),
        });
    }
    if let Some(truth) = ground_truth
        && truth.len() != len
    {
        return Err(TiscanError::LabelLengthMismatch {
            what: "ground truth",
            expected: len,
            found: truth.len(),
        });
    }

    let silhouette = if options.silhouette {
        let score = silhouette::silhouette(points, labels, &options.metric);
        if score.is_none() {
            warn!(points = len, "silhouette is undefined for fewer than two points");
        }
        score
    } else {
        None
    };

    let davies_bouldin =
        match davies_bouldin::davies_bouldin(points, labels, options.noise, &options.metric) {
            Ok(index) => Some(index),
            Err(reason) => {
                warn!(%reason, "davies-bouldin index is undefined");
                None
            }
        };

    let external =
        ground_truth.map(|truth| ExternalScores::compute(truth, labels.assignments()));

    let stats = Stats {
        points: len,
        dimensions: points.dimensions(),
        roles: RoleCounts::tally(points),
        clusters: labels.cluster_count(),
        noise: labels.noise_count(),
        mean_distance_evaluations: points.total_distance_evaluations() as f64 / len as f64,
        silhouette,
        davies_bouldin,
        external,
    };
    info!(
        clusters = stats.clusters,
        noise = stats.noise,
        silhouette = ?stats.silhouette,
        davies_bouldin = ?stats.davies_bouldin,
        "validity computed"
    );
    Ok(stats)
}
