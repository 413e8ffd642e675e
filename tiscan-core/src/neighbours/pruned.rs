//! Triangle-inequality pruned neighbour search.
//!
//! Candidates are visited outward from the target's position in the
//! [`DistanceIndex`], always on the side with the smaller projected gap, so
//! gaps arrive in non-decreasing order. The first gap that exceeds the current
//! search radius ends the sweep on both sides.

use std::collections::BinaryHeap;

use crate::{distance::Minkowski, point::PointSet};

use super::{Hits, Neighbour, NeighbourStrategy, reference::DistanceIndex};

const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Whether a candidate with projected `gap` may still lie within `bound`.
///
/// The slack absorbs rounding in the projections so that candidates tied with
/// the bound are evaluated rather than discarded.
fn admits(gap: f64, bound: f64, scale: f64) -> bool {
    gap <= bound + RELATIVE_TOLERANCE * scale.max(bound).max(1.0)
}

/// Walks sorted positions outward from a target, smaller gap first.
#[derive(Debug)]
struct Cursor<'a> {
    index: &'a DistanceIndex,
    anchor: f64,
    below: usize,
    above: usize,
}

impl<'a> Cursor<'a> {
    fn around(index: &'a DistanceIndex, target: usize) -> Self {
        let position = index.position_of(target);
        Self {
            index,
            anchor: index.projection(target),
            below: position,
            above: position + 1,
        }
    }
}

impl Iterator for Cursor<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let down = (self.below > 0).then(|| self.index.gap(self.below - 1, self.anchor));
        let up = (self.above < self.index.len()).then(|| self.index.gap(self.above, self.anchor));
        match (down, up) {
            (Some(down), Some(up)) if down <= up => {
                self.below -= 1;
                Some((self.index.id_at(self.below), down))
            }
            (Some(down), None) => {
                self.below -= 1;
                Some((self.index.id_at(self.below), down))
            }
            (_, Some(up)) => {
                let id = self.index.id_at(self.above);
                self.above += 1;
                Some((id, up))
            }
            (None, None) => None,
        }
    }
}

/// Offers `candidate` to a max-heap holding at most `capacity` neighbours.
fn offer(heap: &mut BinaryHeap<Neighbour>, candidate: Neighbour, capacity: usize) {
    if heap.len() < capacity {
        heap.push(candidate);
    } else if let Some(mut furthest) = heap.peek_mut()
        && candidate < *furthest
    {
        *furthest = candidate;
    }
}

/// Prunes candidates using their projection onto a reference point.
#[derive(Debug)]
pub(crate) struct Pruned<'a> {
    points: &'a PointSet,
    metric: &'a Minkowski,
    index: &'a DistanceIndex,
}

impl<'a> Pruned<'a> {
    pub(crate) fn new(points: &'a PointSet, metric: &'a Minkowski, index: &'a DistanceIndex) -> Self {
        Self {
            points,
            metric,
            index,
        }
    }

    fn distance(&self, target: usize, candidate: usize) -> f64 {
        self.metric.evaluate(
            self.points.coordinates(target),
            self.points.coordinates(candidate),
        )
    }
}

impl NeighbourStrategy for Pruned<'_> {
    fn knn(&self, target: usize, k: usize) -> Hits<Neighbour> {
        let mut heap: BinaryHeap<Neighbour> = BinaryHeap::with_capacity(k);
        let mut evaluations = 0;
        if k == 0 {
            return Hits {
                items: Vec::new(),
                evaluations,
            };
        }

        let scale = self.index.projection(target);
        for (id, gap) in Cursor::around(self.index, target) {
            if heap.len() == k
                && let Some(furthest) = heap.peek()
                && !admits(gap, furthest.distance, scale)
            {
                break;
            }
            evaluations += 1;
            let candidate = Neighbour {
                id,
                distance: self.distance(target, id),
            };
            offer(&mut heap, candidate, k);
        }

        let mut items = heap.into_vec();
        items.sort_unstable();
        Hits { items, evaluations }
    }

    fn within(&self, target: usize, eps: f64) -> Hits<usize> {
        let mut items = vec![target];
        let mut evaluations = 0;
        let scale = self.index.projection(target);
        let position = self.index.position_of(target);

        let mut sweep = |positions: &mut dyn Iterator<Item = usize>| {
            for slot in positions {
                let id = self.index.id_at(slot);
                if !admits(self.index.gap(slot, scale), eps, scale) {
                    break;
                }
                evaluations += 1;
                if self.distance(target, id) <= eps {
                    items.push(id);
                }
            }
        };
        sweep(&mut (0..position).rev());
        sweep(&mut (position + 1..self.index.len()));

        items.sort_unstable();
        Hits { items, evaluations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbours::reference::ReferencePoint;
    use rstest::rstest;

    fn line(values: &[f64]) -> PointSet {
        PointSet::new(1, values.iter().map(|&v| vec![v]).collect()).expect("valid rows")
    }

    #[rstest]
    #[case::exact(1.0, 1.0, 0.0, true)]
    #[case::rounding(1.0 + 1e-12, 1.0, 0.0, true)]
    #[case::beyond(1.1, 1.0, 0.0, false)]
    #[case::scaled(1e6 + 1e-4, 1e6, 1e6, true)]
    fn admits_within_tolerance(
        #[case] gap: f64,
        #[case] bound: f64,
        #[case] scale: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(admits(gap, bound, scale), expected);
    }

    #[test]
    fn cursor_yields_non_decreasing_gaps() {
        let mut points = line(&[0.0, 1.0, 1.5, 4.0, 4.2, 9.0]);
        let reference = ReferencePoint::from_minima(&points).expect("non-empty");
        let index = DistanceIndex::build(&mut points, &reference, &Minkowski::EUCLIDEAN);

        let visited: Vec<_> = Cursor::around(&index, 3).collect();
        let ids: Vec<_> = visited.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![4, 2, 1, 0, 5]);
        assert!(visited.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    }

    #[test]
    fn knn_stops_before_distant_candidates() {
        let mut points = line(&[0.0, 1.0, 2.0, 100.0, 200.0, 300.0]);
        let reference = ReferencePoint::from_minima(&points).expect("non-empty");
        let index = DistanceIndex::build(&mut points, &reference, &Minkowski::EUCLIDEAN);
        let pruned = Pruned::new(&points, &Minkowski::EUCLIDEAN, &index);

        let hits = pruned.knn(0, 2);
        let ids: Vec<_> = hits.items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(hits.evaluations, 2);
    }

    #[test]
    fn knn_breaks_distance_ties_by_id() {
        let mut points = line(&[2.0, 2.0, 2.0, 2.0, 7.0]);
        let reference = ReferencePoint::from_minima(&points).expect("non-empty");
        let index = DistanceIndex::build(&mut points, &reference, &Minkowski::EUCLIDEAN);
        let pruned = Pruned::new(&points, &Minkowski::EUCLIDEAN, &index);

        let hits = pruned.knn(4, 2);
        let found: Vec<_> = hits.items.iter().map(|n| (n.id, n.distance)).collect();
        assert_eq!(found, vec![(0, 5.0), (1, 5.0)]);
        assert_eq!(hits.evaluations, 4);
    }

    #[test]
    fn within_includes_target_and_boundary() {
        let mut points = line(&[0.0, 1.0, 2.0, 3.5]);
        let reference = ReferencePoint::from_minima(&points).expect("non-empty");
        let index = DistanceIndex::build(&mut points, &reference, &Minkowski::EUCLIDEAN);
        let pruned = Pruned::new(&points, &Minkowski::EUCLIDEAN, &index);

        let hits = pruned.within(1, 1.0);
        assert_eq!(hits.items, vec![0, 1, 2]);
        assert_eq!(hits.evaluations, 2);
    }
}
