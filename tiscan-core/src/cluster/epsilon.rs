//! Density-reachability expansion over epsilon-neighbourhoods.

use crate::{
    labels::{ClusterId, ClusterLabeling},
    point::{PointRole, PointSet},
};

use super::worklist::Worklist;

/// Labels every point reachable from a core point, in id order.
///
/// A point is core when its neighbourhood, itself included, holds at least
/// `min_pts` points. Earlier clusters keep the border points they reach first.
pub(super) fn expand(points: &mut PointSet, min_pts: usize) -> ClusterLabeling {
    let len = points.len();
    let is_core: Vec<bool> = points
        .points()
        .iter()
        .map(|point| point.eps_neighbourhood().len() >= min_pts)
        .collect();
    let mut labels = vec![ClusterId::NOISE; len];
    let mut worklist = Worklist::new(len);
    let mut clusters = 0u64;

    for seed in 0..len {
        if !labels[seed].is_noise() || !is_core[seed] {
            continue;
        }
        clusters += 1;
        let cluster = ClusterId::new(clusters);
        worklist.seed(seed);

        while let Some(member) = worklist.pop() {
            if !labels[member].is_noise() {
                continue;
            }
            labels[member] = cluster;
            if is_core[member] {
                for &next in points.points()[member].eps_neighbourhood() {
                    if labels[next].is_noise() {
                        worklist.offer(next);
                    }
                }
            }
        }
    }

    for ((point, label), core) in points.points_mut().iter_mut().zip(&labels).zip(is_core) {
        point.role = match (label.is_noise(), core) {
            (true, _) => PointRole::Noise,
            (false, true) => PointRole::Core,
            (false, false) => PointRole::Border,
        };
    }

    ClusterLabeling::from_parts(labels, clusters as usize)
}
