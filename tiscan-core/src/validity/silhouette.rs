//! Silhouette coefficient with noise points treated as singleton clusters.

use crate::{distance::Minkowski, labels::ClusterLabeling, point::PointSet};

/// Running mean of the per-point silhouette, or `None` below two points.
///
/// Per-cluster distance sums are rebuilt for each point, so only `O(C)`
/// memory is held at once.
pub(super) fn silhouette(
    points: &PointSet,
    labels: &ClusterLabeling,
    metric: &Minkowski,
) -> Option<f64> {
    let len = points.len();
    if len < 2 {
        return None;
    }

    let assignments = labels.assignments();
    let slots = labels.cluster_count() + 1;
    let mut sums = vec![0.0; slots];
    let mut counts = vec![0usize; slots];
    let mut mean = 0.0;

    for (i, own) in assignments.iter().enumerate() {
        sums.fill(0.0);
        counts.fill(0);
        let mut nearest_noise = f64::INFINITY;
        let origin = points.coordinates(i);

        for (j, other) in assignments.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance = metric.evaluate(origin, points.coordinates(j));
            if other.is_noise() {
                nearest_noise = nearest_noise.min(distance);
            } else {
                let slot = other.get() as usize;
                sums[slot] += distance;
                counts[slot] += 1;
            }
        }

        let own_slot = own.get() as usize;
        let a = if own.is_noise() || counts[own_slot] == 0 {
            0.0
        } else {
            sums[own_slot] / counts[own_slot] as f64
        };
        let b = (1..slots)
            .filter(|&slot| slot != own_slot && counts[slot] > 0)
            .map(|slot| sums[slot] / counts[slot] as f64)
            .fold(nearest_noise, f64::min);

        let score = if b.is_infinite() || a.max(b) == 0.0 {
            0.0
        } else {
            (b - a) / a.max(b)
        };
        mean += (score - mean) / (i + 1) as f64;
    }

    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ClusterId;

    fn labelled(rows: &[f64], raw: &[u64]) -> (PointSet, ClusterLabeling) {
        let points =
            PointSet::new(1, rows.iter().map(|&v| vec![v]).collect()).expect("valid rows");
        let labels = ClusterLabeling::try_from_assignments(
            raw.iter().copied().map(ClusterId::new).collect(),
        )
        .expect("contiguous ids");
        (points, labels)
    }

    #[test]
    fn well_separated_clusters_score_near_one() {
        let (points, labels) = labelled(&[0.0, 1.0, 100.0, 101.0], &[1, 1, 2, 2]);
        let score = silhouette(&points, &labels, &Minkowski::EUCLIDEAN).expect("defined");
        assert!(score > 0.98, "got {score}");
    }

    #[test]
    fn single_cluster_scores_zero() {
        let (points, labels) = labelled(&[0.0, 1.0, 2.0], &[1, 1, 1]);
        assert_eq!(silhouette(&points, &labels, &Minkowski::EUCLIDEAN), Some(0.0));
    }

    #[test]
    fn noise_points_are_their_own_clusters() {
        // Each point has a = 0 and its singleton neighbour at distance 1.
        let (points, labels) = labelled(&[0.0, 1.0], &[0, 0]);
        assert_eq!(silhouette(&points, &labels, &Minkowski::EUCLIDEAN), Some(1.0));
    }

    #[test]
    fn coincident_points_score_zero() {
        let (points, labels) = labelled(&[3.0, 3.0], &[1, 2]);
        assert_eq!(silhouette(&points, &labels, &Minkowski::EUCLIDEAN), Some(0.0));
    }

    #[test]
    fn undefined_below_two_points() {
        let (points, labels) = labelled(&[3.0], &[1]);
        assert_eq!(silhouette(&points, &labels, &Minkowski::EUCLIDEAN), None);
    }
}
