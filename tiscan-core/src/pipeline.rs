//! Core clustering orchestration for the Tiscan library.
//!
//! Provides the [`Tiscan`] runtime entry point, which runs neighbour search,
//! cluster expansion and validity scoring over a [`PointSet`] in order.

use tracing::{instrument, warn};

use crate::{
    Result,
    cluster::{Algorithm, run_clustering},
    error::TiscanError,
    labels::ClusterLabeling,
    neighbours::{NeighbourQuery, SearchMode, SearchReport, run_neighbour_search},
    point::PointSet,
    validity::{Stats, ValidityOptions, compute_validity},
};

/// Outputs of a complete [`Tiscan::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Neighbour search summary.
    pub search: SearchReport,
    /// Final cluster labels.
    pub labels: ClusterLabeling,
    /// Validity metrics for the labels.
    pub stats: Stats,
}

/// Validated pipeline configuration.
///
/// # Examples
/// ```
/// use tiscan_core::{ClusterId, PointSet, TiscanBuilder};
///
/// let mut points = PointSet::new(
///     2,
///     vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![10.0, 10.0]],
/// )?;
/// let tiscan = TiscanBuilder::new().with_eps(1.5).with_min_pts(2).build()?;
/// let report = tiscan.run(&mut points, None)?;
/// assert_eq!(report.labels.cluster_count(), 1);
/// assert_eq!(report.labels.get(3), Some(ClusterId::NOISE));
/// assert_eq!(report.stats.roles.core, 3);
/// # Ok::<(), tiscan_core::TiscanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tiscan {
    search_mode: SearchMode,
    query: NeighbourQuery,
    algorithm: Algorithm,
    validity: ValidityOptions,
}

impl Tiscan {
    pub(crate) fn new(
        search_mode: SearchMode,
        query: NeighbourQuery,
        algorithm: Algorithm,
        validity: ValidityOptions,
    ) -> Self {
        Self {
            search_mode,
            query,
            algorithm,
            validity,
        }
    }

    /// Returns the neighbour-search strategy.
    #[must_use]
    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Returns the neighbour relation the algorithm consumes.
    #[must_use]
    pub fn query(&self) -> NeighbourQuery {
        self.query
    }

    /// Returns the clustering algorithm and its parameters.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the scoring options, including the distance metric.
    #[must_use]
    pub fn validity_options(&self) -> &ValidityOptions {
        &self.validity
    }

    /// Runs the configured neighbour search.
    ///
    /// # Errors
    /// Propagates [`run_neighbour_search`] errors.
    pub fn search(&self, points: &mut PointSet) -> Result<SearchReport> {
        run_neighbour_search(points, self.search_mode, self.query, &self.validity.metric)
    }

    /// Clusters the relations left by [`Self::search`].
    ///
    /// # Errors
    /// Propagates [`run_clustering`] errors.
    pub fn cluster(&self, points: &mut PointSet) -> Result<ClusterLabeling> {
        run_clustering(points, self.algorithm)
    }

    /// Lowers the neighbour-count threshold to the `k` the search could honour.
    fn capped_algorithm(&self, search: &SearchReport) -> Algorithm {
        match (self.algorithm, search.effective_k) {
            (Algorithm::NeighbourCount { k, density_factor }, Some(effective)) if effective < k => {
                let capped = effective.max(1);
                warn!(requested = k, capped, "lowering the core threshold to the capped k");
                Algorithm::NeighbourCount {
                    k: capped,
                    density_factor,
                }
            }
            (algorithm, _) => algorithm,
        }
    }

    /// Scores `labels` with the configured options.
    ///
    /// # Errors
    /// Propagates [`compute_validity`] errors.
    pub fn score(
        &self,
        points: &PointSet,
        labels: &ClusterLabeling,
        ground_truth: Option<&[u64]>,
    ) -> Result<Stats> {
        compute_validity(points, labels, ground_truth, &self.validity)
    }

    /// Rejects inputs that no stage could process.
    ///
    /// # Errors
    /// Returns [`TiscanError::EmptyDataset`] for an empty set and
    /// [`TiscanError::LabelLengthMismatch`] when `ground_truth` does not
    /// cover every point.
    pub fn check_inputs(points: &PointSet, ground_truth: Option<&[u64]>) -> Result<()> {
        if points.is_empty() {
            warn!("point set is empty, returning error");
            return Err(TiscanError::EmptyDataset);
        }
        if let Some(truth) = ground_truth
            && truth.len() != points.len()
        {
            return Err(TiscanError::LabelLengthMismatch {
                what: "ground truth",
                expected: points.len(),
                found: truth.len(),
            });
        }
        Ok(())
    }

    /// Executes search, clustering and scoring in order.
    ///
    /// # Errors
    /// Returns [`TiscanError::EmptyDataset`] for an empty set and
    /// [`TiscanError::LabelLengthMismatch`] when `ground_truth` does not
    /// cover every point, both before any computation; otherwise propagates
    /// stage errors.
    #[instrument(
        name = "core.run",
        err,
        skip(self, points, ground_truth),
        fields(
            points = points.len(),
            dimensions = points.dimensions(),
            algorithm = %self.algorithm.kind(),
            mode = %self.search_mode,
        ),
    )]
    pub fn run(&self, points: &mut PointSet, ground_truth: Option<&[u64]>) -> Result<RunReport> {
        Self::check_inputs(points, ground_truth)?;

        let search = self.search(points)?;
        let algorithm = self.capped_algorithm(&search);
        let labels = run_clustering(points, algorithm)?;
        let stats = self.score(points, &labels, ground_truth)?;
        Ok(RunReport {
            search,
            labels,
            stats,
        })
    }
}
