//! Exhaustive neighbour search comparing every pair of points.

use crate::{distance::Minkowski, point::PointSet};

use super::{Hits, Neighbour, NeighbourStrategy};

/// Evaluates the distance from the target to every other point.
#[derive(Debug)]
pub(crate) struct BruteForce<'a> {
    points: &'a PointSet,
    metric: &'a Minkowski,
}

impl<'a> BruteForce<'a> {
    pub(crate) fn new(points: &'a PointSet, metric: &'a Minkowski) -> Self {
        Self { points, metric }
    }

    fn distance(&self, target: usize, candidate: usize) -> f64 {
        self.metric.evaluate(
            self.points.coordinates(target),
            self.points.coordinates(candidate),
        )
    }
}

impl NeighbourStrategy for BruteForce<'_> {
    fn knn(&self, target: usize, k: usize) -> Hits<Neighbour> {
        let mut candidates: Vec<Neighbour> = (0..self.points.len())
            .filter(|&id| id != target)
            .map(|id| Neighbour {
                id,
                distance: self.distance(target, id),
            })
            .collect();
        let evaluations = candidates.len() as u64;
        candidates.sort_unstable();
        candidates.truncate(k);
        Hits {
            items: candidates,
            evaluations,
        }
    }

    fn within(&self, target: usize, eps: f64) -> Hits<usize> {
        let mut items = Vec::new();
        let mut evaluations = 0;
        for id in 0..self.points.len() {
            if id == target {
                items.push(id);
                continue;
            }
            evaluations += 1;
            if self.distance(target, id) <= eps {
                items.push(id);
            }
        }
        Hits { items, evaluations }
    }
}
