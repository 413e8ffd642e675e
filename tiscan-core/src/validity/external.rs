//! Pair-counting scores against ground-truth labels.

use std::collections::HashMap;

use crate::labels::ClusterId;

/// Agreement between a labelling and ground truth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExternalScores {
    /// Point pairs sharing both a true label and a cluster.
    pub true_positives: u64,
    /// Point pairs differing in both true label and cluster.
    pub true_negatives: u64,
    /// Share of point pairs on which truth and clustering agree, in `[0, 1]`.
    pub rand_index: f64,
    /// Share of points in the dominant cluster of their true class, in `[0, 1]`.
    pub purity: f64,
}

type Counts = HashMap<u64, u64>;
type CellCounts = HashMap<(u64, u64), u64>;

fn comb2(value: u64) -> u64 {
    value * value.saturating_sub(1) / 2
}

impl ExternalScores {
    /// Scores `clusters` against `truth`, which must have equal lengths.
    ///
    /// Noise takes part as cluster zero. With fewer than two points there are
    /// no pairs to disagree on and the Rand index is `1.0`.
    pub(crate) fn compute(truth: &[u64], clusters: &[ClusterId]) -> Self {
        let mut truth_counts = Counts::new();
        let mut cluster_counts = Counts::new();
        let mut cells = CellCounts::new();
        for (&class, cluster) in truth.iter().zip(clusters) {
            *truth_counts.entry(class).or_insert(0) += 1;
            *cluster_counts.entry(cluster.get()).or_insert(0) += 1;
            *cells.entry((class, cluster.get())).or_insert(0) += 1;
        }

        let items = truth.len() as u64;
        let true_positives: u64 = cells.values().copied().map(comb2).sum();
        let same_class: u64 = truth_counts.values().copied().map(comb2).sum();
        let same_cluster: u64 = cluster_counts.values().copied().map(comb2).sum();
        let pairs = comb2(items);
        let true_negatives = pairs + true_positives - same_class - same_cluster;

        let rand_index = if pairs == 0 {
            1.0
        } else {
            (true_positives + true_negatives) as f64 / pairs as f64
        };

        let mut dominant = Counts::new();
        for (&(class, _), &count) in &cells {
            let best = dominant.entry(class).or_insert(0);
            *best = (*best).max(count);
        }
        let purity = if items == 0 {
            1.0
        } else {
            dominant.values().sum::<u64>() as f64 / items as f64
        };

        Self {
            true_positives,
            true_negatives,
            rand_index,
            purity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<ClusterId> {
        raw.iter().copied().map(ClusterId::new).collect()
    }

    #[test]
    fn identical_partitions_score_one() {
        let scores = ExternalScores::compute(&[5, 5, 7, 7], &ids(&[1, 1, 2, 2]));
        assert_eq!(scores.true_positives, 2);
        assert_eq!(scores.true_negatives, 4);
        assert_eq!(scores.rand_index, 1.0);
        assert_eq!(scores.purity, 1.0);
    }

    #[test]
    fn merged_clusters_lose_true_negatives() {
        let scores = ExternalScores::compute(&[0, 0, 1, 1], &ids(&[1, 1, 1, 1]));
        assert_eq!(scores.true_positives, 2);
        assert_eq!(scores.true_negatives, 0);
        assert!((scores.rand_index - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(scores.purity, 1.0);
    }

    #[test]
    fn purity_takes_the_dominant_cluster_of_each_class() {
        let scores = ExternalScores::compute(&[0, 0, 0, 1], &ids(&[1, 1, 2, 2]));
        assert!((scores.purity - 3.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_is_trivially_consistent() {
        let scores = ExternalScores::compute(&[3], &ids(&[0]));
        assert_eq!(scores.rand_index, 1.0);
        assert_eq!(scores.purity, 1.0);
        assert_eq!(scores.true_negatives, 0);
    }
}
