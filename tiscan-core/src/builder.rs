//! Builder utilities for configuring Tiscan pipelines.
//!
//! Collects the neighbour-search, clustering and scoring parameters and
//! validates them before constructing a [`Tiscan`] instance.

use crate::{
    Result,
    cluster::{Algorithm, AlgorithmKind, DENSITY_FACTOR},
    distance::Minkowski,
    neighbours::{NeighbourQuery, SearchMode},
    pipeline::Tiscan,
    validity::{NoiseTreatment, ValidityOptions},
};

/// Configures and constructs [`Tiscan`] instances.
///
/// # Examples
/// ```
/// use tiscan_core::{AlgorithmKind, SearchMode, TiscanBuilder};
///
/// let tiscan = TiscanBuilder::new()
///     .with_algorithm(AlgorithmKind::NeighbourCount)
///     .with_k(5)
///     .with_search_mode(SearchMode::BruteForce)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(tiscan.algorithm().kind(), AlgorithmKind::NeighbourCount);
/// assert_eq!(tiscan.search_mode(), SearchMode::BruteForce);
/// ```
#[derive(Debug, Clone)]
pub struct TiscanBuilder {
    algorithm: AlgorithmKind,
    eps: f64,
    min_pts: usize,
    k: usize,
    density_factor: f64,
    minkowski_order: f64,
    search_mode: SearchMode,
    noise_treatment: NoiseTreatment,
    silhouette: bool,
}

impl Default for TiscanBuilder {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::Epsilon,
            eps: 2.0,
            min_pts: 4,
            k: 3,
            density_factor: DENSITY_FACTOR,
            minkowski_order: 2.0,
            search_mode: SearchMode::Pruned,
            noise_treatment: NoiseTreatment::Exclude,
            silhouette: true,
        }
    }
}

impl TiscanBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use tiscan_core::{AlgorithmKind, TiscanBuilder};
    ///
    /// let builder = TiscanBuilder::new();
    /// assert_eq!(builder.algorithm(), AlgorithmKind::Epsilon);
    /// assert_eq!(builder.eps(), 2.0);
    /// assert_eq!(builder.min_pts(), 4);
    /// assert_eq!(builder.k(), 3);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the clustering algorithm family.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns the selected algorithm family.
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    /// Overrides the epsilon-neighbourhood radius.
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Returns the configured radius.
    #[must_use]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Overrides the core-point neighbourhood size of the epsilon variant.
    #[must_use]
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Returns the configured core-point neighbourhood size.
    #[must_use]
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Overrides the neighbour count of the reverse-neighbour variant.
    ///
    /// # Examples
    /// ```
    /// use tiscan_core::TiscanBuilder;
    ///
    /// let builder = TiscanBuilder::new().with_k(7);
    /// assert_eq!(builder.k(), 7);
    /// ```
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Overrides the reverse-neighbour pull threshold multiplier.
    #[must_use]
    pub fn with_density_factor(mut self, factor: f64) -> Self {
        self.density_factor = factor;
        self
    }

    /// Returns the configured pull threshold multiplier.
    #[must_use]
    pub fn density_factor(&self) -> f64 {
        self.density_factor
    }

    /// Overrides the Minkowski order of the distance metric.
    #[must_use]
    pub fn with_minkowski_order(mut self, order: f64) -> Self {
        self.minkowski_order = order;
        self
    }

    /// Returns the configured Minkowski order.
    #[must_use]
    pub fn minkowski_order(&self) -> f64 {
        self.minkowski_order
    }

    /// Selects the neighbour-search strategy.
    #[must_use]
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Returns the selected neighbour-search strategy.
    #[must_use]
    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Selects how noise takes part in the Davies–Bouldin index.
    #[must_use]
    pub fn with_noise_treatment(mut self, treatment: NoiseTreatment) -> Self {
        self.noise_treatment = treatment;
        self
    }

    /// Returns the selected noise treatment.
    #[must_use]
    pub fn noise_treatment(&self) -> NoiseTreatment {
        self.noise_treatment
    }

    /// Enables or disables the silhouette coefficient.
    #[must_use]
    pub fn with_silhouette(mut self, enabled: bool) -> Self {
        self.silhouette = enabled;
        self
    }

    /// Returns whether the silhouette coefficient will be computed.
    #[must_use]
    pub fn silhouette(&self) -> bool {
        self.silhouette
    }

    /// Validates the configuration and constructs a [`Tiscan`] instance.
    ///
    /// Only the parameters of the selected algorithm are checked.
    ///
    /// # Errors
    /// Returns [`crate::TiscanError::Metric`] for an invalid Minkowski order,
    /// [`crate::TiscanError::InvalidEpsilon`] or
    /// [`crate::TiscanError::InvalidMinPts`] for the epsilon variant, and
    /// [`crate::TiscanError::InvalidK`] or
    /// [`crate::TiscanError::InvalidDensityFactor`] for the neighbour-count
    /// variant.
    ///
    /// # Examples
    /// ```
    /// use tiscan_core::{TiscanBuilder, TiscanErrorCode};
    ///
    /// let err = TiscanBuilder::new().with_eps(0.0).build().expect_err("eps must be positive");
    /// assert_eq!(err.code(), TiscanErrorCode::InvalidEpsilon);
    /// ```
    pub fn build(self) -> Result<Tiscan> {
        let metric = Minkowski::new(self.minkowski_order)?;
        let (query, algorithm) = match self.algorithm {
            AlgorithmKind::Epsilon => (
                NeighbourQuery::Epsilon { eps: self.eps },
                Algorithm::Epsilon {
                    min_pts: self.min_pts,
                },
            ),
            AlgorithmKind::NeighbourCount => (
                NeighbourQuery::Knn { k: self.k },
                Algorithm::NeighbourCount {
                    k: self.k,
                    density_factor: self.density_factor,
                },
            ),
        };
        query.validate()?;
        algorithm.validate()?;

        Ok(Tiscan::new(
            self.search_mode,
            query,
            algorithm,
            ValidityOptions {
                metric,
                noise: self.noise_treatment,
                silhouette: self.silhouette,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TiscanErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case::eps(TiscanBuilder::new().with_eps(-1.0), TiscanErrorCode::InvalidEpsilon)]
    #[case::infinite_eps(TiscanBuilder::new().with_eps(f64::INFINITY), TiscanErrorCode::InvalidEpsilon)]
    #[case::min_pts(TiscanBuilder::new().with_min_pts(0), TiscanErrorCode::InvalidMinPts)]
    #[case::order(TiscanBuilder::new().with_minkowski_order(0.5), TiscanErrorCode::InvalidMetric)]
    #[case::k(
        TiscanBuilder::new().with_algorithm(AlgorithmKind::NeighbourCount).with_k(0),
        TiscanErrorCode::InvalidK
    )]
    #[case::density_factor(
        TiscanBuilder::new()
            .with_algorithm(AlgorithmKind::NeighbourCount)
            .with_density_factor(f64::NAN),
        TiscanErrorCode::InvalidDensityFactor
    )]
    fn rejects_invalid_configuration(
        #[case] builder: TiscanBuilder,
        #[case] expected: TiscanErrorCode,
    ) {
        let err = builder.build().expect_err("configuration must be rejected");
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn ignores_parameters_of_the_unselected_algorithm() {
        let tiscan = TiscanBuilder::new()
            .with_k(0)
            .build()
            .expect("k is unused by the epsilon variant");
        assert_eq!(tiscan.algorithm(), Algorithm::Epsilon { min_pts: 4 });
        assert_eq!(tiscan.query(), NeighbourQuery::Epsilon { eps: 2.0 });
    }

    #[test]
    fn carries_validity_options() {
        let tiscan = TiscanBuilder::new()
            .with_minkowski_order(1.0)
            .with_noise_treatment(NoiseTreatment::IncludeAsCluster)
            .with_silhouette(false)
            .build()
            .expect("configuration is valid");
        let options = tiscan.validity_options();
        assert_eq!(options.metric, Minkowski::MANHATTAN);
        assert_eq!(options.noise, NoiseTreatment::IncludeAsCluster);
        assert!(!options.silhouette);
    }
}
