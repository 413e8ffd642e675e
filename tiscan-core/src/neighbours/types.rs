//! Neighbour ordering shared by every search strategy.

use std::cmp::Ordering;

/// Neighbour discovered during a search, including its distance from the query.
///
/// Neighbours order by ascending distance with ties broken by id, which makes
/// every search deterministic.
///
/// # Examples
/// ```
/// use tiscan_core::Neighbour;
///
/// let near = Neighbour { id: 7, distance: 0.5 };
/// let tied = Neighbour { id: 9, distance: 0.5 };
/// assert!(near < tied);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Id of the neighbour within the [`crate::PointSet`].
    pub id: usize,
    /// Distance between the query point and [`Neighbour::id`].
    pub distance: f64,
}

impl Eq for Neighbour {}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
