//! Reference-point projection used by the pruned search.
//!
//! Every point is projected onto its distance from a single synthetic
//! reference point. By the triangle inequality `|d(r, a) − d(r, b)|` never
//! exceeds `d(a, b)`, so the projected gap is a lower bound on the true
//! distance and candidates can be discarded without evaluating it.

use crate::{distance::Minkowski, point::PointSet};

/// Synthetic point built from the per-dimension minima of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferencePoint {
    coordinates: Vec<f64>,
}

impl ReferencePoint {
    /// Builds the reference point for a non-empty set.
    ///
    /// Returns `None` when `points` is empty.
    #[must_use]
    pub fn from_minima(points: &PointSet) -> Option<Self> {
        let (first, rest) = points.points().split_first()?;
        let mut coordinates = first.coordinates().to_vec();
        for point in rest {
            for (minimum, &value) in coordinates.iter_mut().zip(point.coordinates()) {
                *minimum = minimum.min(value);
            }
        }
        Some(Self { coordinates })
    }

    /// Coordinates of the reference point.
    #[must_use]
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }
}

/// Points sorted by ascending distance to a [`ReferencePoint`], ties by id.
#[derive(Clone, Debug)]
pub(crate) struct DistanceIndex {
    order: Vec<usize>,
    projected: Vec<f64>,
    positions: Vec<usize>,
}

impl DistanceIndex {
    /// Projects every point onto `reference`, recording the projection on
    /// each point. Costs exactly one distance evaluation per point.
    pub(crate) fn build(
        points: &mut PointSet,
        reference: &ReferencePoint,
        metric: &Minkowski,
    ) -> Self {
        let projected: Vec<f64> = points
            .points()
            .iter()
            .map(|point| metric.evaluate(point.coordinates(), reference.coordinates()))
            .collect();
        for (point, &distance) in points.points_mut().iter_mut().zip(&projected) {
            point.set_reference_distance(distance);
        }

        let mut order: Vec<usize> = (0..projected.len()).collect();
        order.sort_unstable_by(|&a, &b| projected[a].total_cmp(&projected[b]).then(a.cmp(&b)));

        let mut positions = vec![0; order.len()];
        for (position, &id) in order.iter().enumerate() {
            positions[id] = position;
        }

        Self {
            order,
            projected,
            positions,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Id stored at sorted `position`.
    pub(crate) fn id_at(&self, position: usize) -> usize {
        self.order[position]
    }

    /// Sorted position of point `id`.
    pub(crate) fn position_of(&self, id: usize) -> usize {
        self.positions[id]
    }

    /// Projected distance of point `id` to the reference point.
    pub(crate) fn projection(&self, id: usize) -> f64 {
        self.projected[id]
    }

    /// Projected gap between the point at `position` and `anchor`.
    pub(crate) fn gap(&self, position: usize, anchor: f64) -> f64 {
        (self.projected[self.order[position]] - anchor).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_takes_per_dimension_minimum() {
        let points = PointSet::new(
            2,
            vec![vec![3.0, -1.0], vec![-2.0, 4.0], vec![0.0, 0.0]],
        )
        .expect("valid rows");
        let reference = ReferencePoint::from_minima(&points).expect("non-empty set");
        assert_eq!(reference.coordinates(), &[-2.0, -1.0]);
    }

    #[test]
    fn index_orders_by_projection_then_id() {
        let mut points = PointSet::new(1, vec![vec![2.0], vec![0.0], vec![2.0], vec![1.0]])
            .expect("valid rows");
        let reference = ReferencePoint::from_minima(&points).expect("non-empty set");
        let index = DistanceIndex::build(&mut points, &reference, &Minkowski::EUCLIDEAN);

        let order: Vec<_> = (0..index.len()).map(|pos| index.id_at(pos)).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(index.position_of(2), 3);
        assert_eq!(index.projection(3), 1.0);
        assert_eq!(points.points()[0].reference_distance(), 2.0);
    }

    #[test]
    fn empty_set_has_no_reference() {
        let points = PointSet::new(2, Vec::new()).expect("empty set is valid");
        assert!(ReferencePoint::from_minima(&points).is_none());
    }
}
