//! Point storage shared by the neighbour search and clustering stages.
//!
//! A [`PointSet`] owns the coordinates of every point together with the
//! per-point neighbour relations and roles that later stages fill in. Ids and
//! coordinates are fixed at construction; everything else is rewritten in
//! place by [`crate::run_neighbour_search`] and [`crate::run_clustering`].

use std::fmt;

use crate::{
    error::{PointSetError, Result, TiscanError},
    neighbours::{Neighbour, NeighbourQuery},
};

/// Density role assigned to a point by clustering.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PointRole {
    /// Meets the density threshold and seeds cluster expansion.
    Core,
    /// Not core, but attached to a cluster through a core point.
    Border,
    /// Below the reverse-neighbour threshold but reached during expansion.
    NonCore,
    /// Assigned to no cluster.
    #[default]
    Noise,
}

impl PointRole {
    /// Returns a stable lowercase name for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Border => "border",
            Self::NonCore => "non-core",
            Self::Noise => "noise",
        }
    }
}

impl fmt::Display for PointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point and the relations computed for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    id: usize,
    coordinates: Vec<f64>,
    reference_distance: f64,
    pub(crate) knn: Vec<Neighbour>,
    pub(crate) rnn: Vec<usize>,
    pub(crate) eps_neighbourhood: Vec<usize>,
    pub(crate) role: PointRole,
    pub(crate) distance_evaluations: u64,
}

impl Point {
    fn new(id: usize, coordinates: Vec<f64>) -> Self {
        Self {
            id,
            coordinates,
            reference_distance: 0.0,
            knn: Vec::new(),
            rnn: Vec::new(),
            eps_neighbourhood: Vec::new(),
            role: PointRole::default(),
            distance_evaluations: 0,
        }
    }

    /// Zero-based position of the point in its [`PointSet`].
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Coordinates of the point.
    #[must_use]
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Nearest neighbours ordered by ascending `(distance, id)`.
    #[must_use]
    pub fn knn(&self) -> &[Neighbour] {
        &self.knn
    }

    /// Ids of the points that list this point among their nearest
    /// neighbours, ascending.
    #[must_use]
    pub fn rnn(&self) -> &[usize] {
        &self.rnn
    }

    /// Ids within the search radius, ascending and including the point itself.
    #[must_use]
    pub fn eps_neighbourhood(&self) -> &[usize] {
        &self.eps_neighbourhood
    }

    /// Role assigned by the most recent clustering run.
    #[must_use]
    pub fn role(&self) -> PointRole {
        self.role
    }

    /// Exact distance evaluations charged to this point by the last search.
    #[must_use]
    pub fn distance_evaluations(&self) -> u64 {
        self.distance_evaluations
    }

    /// Distance to the reference point, or zero after a brute-force search.
    #[must_use]
    pub fn reference_distance(&self) -> f64 {
        self.reference_distance
    }

    /// Distance to the furthest retained nearest neighbour, if any.
    #[must_use]
    pub fn k_distance(&self) -> Option<f64> {
        self.knn.last().map(|neighbour| neighbour.distance)
    }

    pub(crate) fn set_reference_distance(&mut self, distance: f64) {
        self.reference_distance = distance;
    }

    fn reset(&mut self) {
        self.reference_distance = 0.0;
        self.knn.clear();
        self.rnn.clear();
        self.eps_neighbourhood.clear();
        self.role = PointRole::default();
        self.distance_evaluations = 0;
    }
}

/// Validated collection of equal-dimension points.
///
/// # Examples
///
/// ```
/// use tiscan_core::PointSet;
///
/// let points = PointSet::new(2, vec![vec![0.0, 0.0], vec![1.0, 1.0]])
///     .expect("rows are valid");
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.point(1).map(|p| p.coordinates()), Some(&[1.0, 1.0][..]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    dimensions: usize,
    points: Vec<Point>,
    last_query: Option<NeighbourQuery>,
}

impl PointSet {
    /// Validates `rows` and assigns ids in row order.
    ///
    /// An empty `rows` vector is accepted; stages that need points report
    /// [`TiscanError::EmptyDataset`] themselves.
    ///
    /// # Errors
    ///
    /// - [`PointSetError::ZeroDimension`] when `dimensions` is zero.
    /// - [`PointSetError::DimensionMismatch`] when a row has the wrong length.
    /// - [`PointSetError::NonFinite`] when a coordinate is NaN or infinite.
    pub fn new(dimensions: usize, rows: Vec<Vec<f64>>) -> Result<Self> {
        if dimensions == 0 {
            return Err(PointSetError::ZeroDimension.into());
        }
        let mut points = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dimensions {
                return Err(TiscanError::from(PointSetError::DimensionMismatch {
                    index,
                    expected: dimensions,
                    found: row.len(),
                }));
            }
            if let Some((dimension, &value)) =
                row.iter().enumerate().find(|(_, value)| !value.is_finite())
            {
                return Err(TiscanError::from(PointSetError::NonFinite {
                    index,
                    dimension,
                    value,
                }));
            }
            points.push(Point::new(index, row));
        }
        Ok(Self {
            dimensions,
            points,
            last_query: None,
        })
    }

    /// Number of coordinates per point.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in id order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Looks up a point by id.
    #[must_use]
    pub fn point(&self, id: usize) -> Option<&Point> {
        self.points.get(id)
    }

    /// Query answered by the most recent neighbour search, if any.
    #[must_use]
    pub fn last_query(&self) -> Option<NeighbourQuery> {
        self.last_query
    }

    /// Total exact distance evaluations charged across all points.
    #[must_use]
    pub fn total_distance_evaluations(&self) -> u64 {
        self.points.iter().map(Point::distance_evaluations).sum()
    }

    pub(crate) fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub(crate) fn begin_search(&mut self, query: NeighbourQuery) {
        self.points.iter_mut().for_each(Point::reset);
        self.last_query = Some(query);
    }

    pub(crate) fn reset_roles(&mut self) {
        for point in &mut self.points {
            point.role = PointRole::default();
        }
    }

    pub(crate) fn coordinates(&self, id: usize) -> &[f64] {
        &self.points[id].coordinates
    }
}
