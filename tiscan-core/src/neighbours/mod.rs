//! Exact neighbour search over a [`PointSet`].
//!
//! [`run_neighbour_search`] fills in every point's k-nearest neighbours (and
//! the reciprocal reverse-neighbour lists) or its epsilon-neighbourhood. Two
//! strategies answer the same query with identical results: an exhaustive
//! pairwise scan and a reference-point projection that prunes candidates with
//! the triangle inequality.

mod brute;
mod pruned;
mod reference;
mod types;

use std::fmt;

use tracing::{Span, info, instrument, warn};

use crate::{
    distance::Minkowski,
    error::{Result, TiscanError},
    point::PointSet,
};

use self::{brute::BruteForce, pruned::Pruned, reference::DistanceIndex};

pub use self::{reference::ReferencePoint, types::Neighbour};

/// Strategy used to answer neighbour queries.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SearchMode {
    /// Evaluate every pair of points.
    BruteForce,
    /// Skip candidates whose reference projection rules them out.
    #[default]
    Pruned,
}

impl SearchMode {
    /// Returns a stable lowercase name for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BruteForce => "brute",
            Self::Pruned => "pruned",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The neighbour relation requested from a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NeighbourQuery {
    /// The `k` nearest other points of every point.
    Knn {
        /// Number of neighbours to retain per point.
        k: usize,
    },
    /// Every point within distance `eps`, the point itself included.
    Epsilon {
        /// Inclusive search radius.
        eps: f64,
    },
}

impl NeighbourQuery {
    /// Checks the query parameters.
    ///
    /// # Errors
    /// Returns [`TiscanError::InvalidK`] when `k` is zero and
    /// [`TiscanError::InvalidEpsilon`] when `eps` is non-finite or not
    /// strictly positive.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Knn { k } if k == 0 => Err(TiscanError::InvalidK { got: k }),
            Self::Epsilon { eps } if !eps.is_finite() || eps <= 0.0 => {
                Err(TiscanError::InvalidEpsilon { got: eps })
            }
            _ => Ok(()),
        }
    }
}

/// Summary of a completed neighbour search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReport {
    /// Strategy that answered the query.
    pub mode: SearchMode,
    /// Query as requested by the caller.
    pub query: NeighbourQuery,
    /// Neighbour count actually used after capping to `n − 1`; `None` for
    /// epsilon queries.
    pub effective_k: Option<usize>,
    /// Exact point-to-point distance evaluations across all points.
    pub distance_evaluations: u64,
    /// Evaluations spent projecting points onto the reference point.
    pub reference_evaluations: u64,
    /// Reference point used by the pruned strategy.
    pub reference: Option<ReferencePoint>,
}

/// Neighbours found for a single target and the evaluations they cost.
#[derive(Debug)]
pub(crate) struct Hits<T> {
    pub(crate) items: Vec<T>,
    pub(crate) evaluations: u64,
}

/// A way of answering per-point neighbour queries.
pub(crate) trait NeighbourStrategy {
    /// The `k` nearest points to `target`, excluding `target`, ordered by
    /// `(distance, id)`.
    fn knn(&self, target: usize, k: usize) -> Hits<Neighbour>;

    /// Ids within `eps` of `target`, including `target`, ascending.
    fn within(&self, target: usize, eps: f64) -> Hits<usize>;
}

enum Resolved {
    Knn(Vec<Hits<Neighbour>>),
    Epsilon(Vec<Hits<usize>>),
}

impl Resolved {
    fn collect<S: NeighbourStrategy>(strategy: &S, len: usize, query: NeighbourQuery) -> Self {
        match query {
            NeighbourQuery::Knn { k } => Self::Knn((0..len).map(|id| strategy.knn(id, k)).collect()),
            NeighbourQuery::Epsilon { eps } => {
                Self::Epsilon((0..len).map(|id| strategy.within(id, eps)).collect())
            }
        }
    }

    /// Writes the answers into `points`, returning the total evaluations.
    fn store(self, points: &mut PointSet) -> u64 {
        let mut total = 0;
        match self {
            Self::Knn(answers) => {
                let mut reverse = vec![Vec::new(); answers.len()];
                for (id, hits) in answers.iter().enumerate() {
                    for neighbour in &hits.items {
                        reverse[neighbour.id].push(id);
                    }
                }
                for ((point, hits), rnn) in points.points_mut().iter_mut().zip(answers).zip(reverse)
                {
                    total += hits.evaluations;
                    point.distance_evaluations = hits.evaluations;
                    point.knn = hits.items;
                    point.rnn = rnn;
                }
            }
            Self::Epsilon(answers) => {
                for (point, hits) in points.points_mut().iter_mut().zip(answers) {
                    total += hits.evaluations;
                    point.distance_evaluations = hits.evaluations;
                    point.eps_neighbourhood = hits.items;
                }
            }
        }
        total
    }
}

/// Computes the requested neighbour relation for every point in `points`.
///
/// Previous neighbour lists, roles and evaluation counters are discarded
/// first, so the search can be repeated with different parameters. A `k`
/// larger than `n − 1` is capped. An empty set yields an empty report.
///
/// # Errors
/// Returns [`TiscanError::InvalidK`] or [`TiscanError::InvalidEpsilon`] when
/// the query is malformed.
///
/// # Examples
/// ```
/// use tiscan_core::{Minkowski, NeighbourQuery, PointSet, SearchMode, run_neighbour_search};
///
/// let mut points = PointSet::new(1, vec![vec![0.0], vec![1.0], vec![5.0]])?;
/// let report = run_neighbour_search(
///     &mut points,
///     SearchMode::Pruned,
///     NeighbourQuery::Knn { k: 1 },
///     &Minkowski::EUCLIDEAN,
/// )?;
/// assert_eq!(report.effective_k, Some(1));
/// assert_eq!(points.points()[2].knn()[0].id, 1);
/// assert_eq!(points.points()[0].rnn(), &[1]);
/// # Ok::<(), tiscan_core::TiscanError>(())
/// ```
#[instrument(
    name = "core.neighbour_search",
    err,
    skip(points, metric),
    fields(
        points = points.len(),
        mode = %mode,
        query = ?query,
        distance_evaluations = tracing::field::Empty,
    ),
)]
pub fn run_neighbour_search(
    points: &mut PointSet,
    mode: SearchMode,
    query: NeighbourQuery,
    metric: &Minkowski,
) -> Result<SearchReport> {
    query.validate()?;
    points.begin_search(query);

    let len = points.len();
    let (effective, effective_k) = match query {
        NeighbourQuery::Knn { k } => {
            let capped = k.min(len.saturating_sub(1));
            if capped < k {
                warn!(requested = k, capped, points = len, "k exceeds the number of other points");
            }
            (NeighbourQuery::Knn { k: capped }, Some(capped))
        }
        NeighbourQuery::Epsilon { .. } => (query, None),
    };

    let reference = match mode {
        SearchMode::Pruned => ReferencePoint::from_minima(points),
        SearchMode::BruteForce => None,
    };
    let (distance_evaluations, reference_evaluations) = match &reference {
        Some(reference) => {
            let index = DistanceIndex::build(points, reference, metric);
            let resolved = Resolved::collect(&Pruned::new(points, metric, &index), len, effective);
            (resolved.store(points), len as u64)
        }
        None => {
            let resolved = Resolved::collect(&BruteForce::new(points, metric), len, effective);
            (resolved.store(points), 0)
        }
    };

    Span::current().record("distance_evaluations", distance_evaluations);
    info!(
        distance_evaluations,
        reference_evaluations,
        "neighbour search completed"
    );
    Ok(SearchReport {
        mode,
        query,
        effective_k,
        distance_evaluations,
        reference_evaluations,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn square_with_outlier() -> PointSet {
        PointSet::new(
            2,
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![10.0, 10.0],
            ],
        )
        .expect("valid rows")
    }

    #[rstest]
    #[case::zero_k(NeighbourQuery::Knn { k: 0 })]
    #[case::zero_eps(NeighbourQuery::Epsilon { eps: 0.0 })]
    #[case::negative_eps(NeighbourQuery::Epsilon { eps: -1.0 })]
    #[case::nan_eps(NeighbourQuery::Epsilon { eps: f64::NAN })]
    fn rejects_malformed_queries(#[case] query: NeighbourQuery) {
        let mut points = square_with_outlier();
        let err = run_neighbour_search(&mut points, SearchMode::Pruned, query, &Minkowski::EUCLIDEAN)
            .expect_err("query must be rejected");
        assert!(matches!(
            err,
            TiscanError::InvalidK { .. } | TiscanError::InvalidEpsilon { .. }
        ));
        assert_eq!(points.last_query(), None);
    }

    #[rstest]
    #[case::brute(SearchMode::BruteForce)]
    #[case::pruned(SearchMode::Pruned)]
    fn caps_k_to_available_points(#[case] mode: SearchMode) {
        let mut points = square_with_outlier();
        let report = run_neighbour_search(
            &mut points,
            mode,
            NeighbourQuery::Knn { k: 10 },
            &Minkowski::EUCLIDEAN,
        )
        .expect("search must succeed");
        assert_eq!(report.effective_k, Some(3));
        assert!(points.points().iter().all(|p| p.knn().len() == 3));
    }

    #[test]
    fn empty_set_yields_empty_report() {
        let mut points = PointSet::new(2, Vec::new()).expect("empty set is valid");
        let report = run_neighbour_search(
            &mut points,
            SearchMode::Pruned,
            NeighbourQuery::Epsilon { eps: 1.0 },
            &Minkowski::EUCLIDEAN,
        )
        .expect("empty search succeeds");
        assert_eq!(report.distance_evaluations, 0);
        assert_eq!(report.reference_evaluations, 0);
        assert!(report.reference.is_none());
    }

    #[test]
    fn brute_force_charges_every_other_point() {
        let mut points = square_with_outlier();
        let report = run_neighbour_search(
            &mut points,
            SearchMode::BruteForce,
            NeighbourQuery::Epsilon { eps: 1.5 },
            &Minkowski::EUCLIDEAN,
        )
        .expect("search must succeed");
        assert_eq!(report.distance_evaluations, 12);
        assert_eq!(points.points()[0].eps_neighbourhood(), &[0, 1, 2]);
        assert_eq!(points.points()[3].eps_neighbourhood(), &[3]);
    }

    #[test]
    fn repeated_search_replaces_previous_relations() {
        let mut points = square_with_outlier();
        let metric = Minkowski::EUCLIDEAN;
        run_neighbour_search(
            &mut points,
            SearchMode::Pruned,
            NeighbourQuery::Epsilon { eps: 1.5 },
            &metric,
        )
        .expect("epsilon search");
        run_neighbour_search(&mut points, SearchMode::Pruned, NeighbourQuery::Knn { k: 1 }, &metric)
            .expect("knn search");

        assert!(points.points().iter().all(|p| p.eps_neighbourhood().is_empty()));
        assert_eq!(points.last_query(), Some(NeighbourQuery::Knn { k: 1 }));
    }
}
