//! Reverse-nearest-neighbour expansion.
//!
//! A point is core when at least `k` points list it among their nearest
//! neighbours. Expansion walks reverse-neighbour lists from each core point
//! and pulls in the reverse neighbours of any sufficiently dense member.
//! Points left unlabelled afterwards join the cluster of their nearest core
//! neighbour, or stay noise when none exists.

use crate::{
    labels::{ClusterId, ClusterLabeling},
    point::{PointRole, PointSet},
};

use super::worklist::Worklist;

/// Labels reverse-neighbour clusters grown from each core point, in id order.
pub(super) fn expand(points: &mut PointSet, k: usize, density_factor: f64) -> ClusterLabeling {
    let len = points.len();
    let is_core: Vec<bool> = points
        .points()
        .iter()
        .map(|point| point.rnn().len() >= k)
        .collect();
    let pull_threshold = density_factor * k as f64;
    let mut labels = vec![ClusterId::NOISE; len];
    let mut worklist = Worklist::new(len);
    let mut clusters = 0u64;

    for core in (0..len).filter(|&id| is_core[id]) {
        let cluster = if labels[core].is_noise() {
            clusters += 1;
            ClusterId::new(clusters)
        } else {
            labels[core]
        };
        labels[core] = cluster;
        worklist.seed(core);

        while let Some(member) = worklist.pop() {
            for &follower in points.points()[member].rnn() {
                let reverse = points.points()[follower].rnn();
                if reverse.len() as f64 > pull_threshold {
                    for &next in reverse {
                        worklist.offer(next);
                    }
                }
                if labels[follower].is_noise() {
                    labels[follower] = cluster;
                }
            }
        }
    }

    let mut roles = Vec::with_capacity(len);
    for (id, point) in points.points().iter().enumerate() {
        let role = if is_core[id] {
            PointRole::Core
        } else if !labels[id].is_noise() {
            PointRole::NonCore
        } else if let Some(nearest) = point.knn().iter().find(|n| is_core[n.id]) {
            labels[id] = labels[nearest.id];
            PointRole::Border
        } else {
            PointRole::Noise
        };
        roles.push(role);
    }
    for (point, role) in points.points_mut().iter_mut().zip(roles) {
        point.role = role;
    }

    ClusterLabeling::from_parts(labels, clusters as usize)
}
