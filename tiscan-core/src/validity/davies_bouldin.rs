//! Davies–Bouldin index over cluster centroids.

use std::fmt;

use crate::{distance::Minkowski, labels::ClusterLabeling, point::PointSet};

use super::NoiseTreatment;

/// Why the index could not be computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Undefined {
    TooFewClusters { clusters: usize },
    CoincidentCentroids { left: u64, right: u64 },
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewClusters { clusters } => {
                write!(f, "{clusters} cluster(s) remain after noise treatment")
            }
            Self::CoincidentCentroids { left, right } => {
                write!(f, "clusters {left} and {right} share a centroid")
            }
        }
    }
}

struct Cluster {
    id: u64,
    centroid: Vec<f64>,
    scatter: f64,
}

fn summarise(
    points: &PointSet,
    labels: &ClusterLabeling,
    noise: NoiseTreatment,
    metric: &Minkowski,
) -> Vec<Cluster> {
    let slots = labels.cluster_count() + 1;
    let dimensions = points.dimensions();
    let mut sums = vec![vec![0.0; dimensions]; slots];
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); slots];
    for (id, label) in labels.assignments().iter().enumerate() {
        let slot = label.get() as usize;
        members[slot].push(id);
        for (sum, value) in sums[slot].iter_mut().zip(points.coordinates(id)) {
            *sum += value;
        }
    }

    let first = match noise {
        NoiseTreatment::Exclude => 1,
        NoiseTreatment::IncludeAsCluster => 0,
    };
    (first..slots)
        .filter(|&slot| !members[slot].is_empty())
        .map(|slot| {
            let size = members[slot].len() as f64;
            let centroid: Vec<f64> = sums[slot].iter().map(|sum| sum / size).collect();
            let scatter = members[slot]
                .iter()
                .map(|&id| metric.evaluate(points.coordinates(id), &centroid))
                .sum::<f64>()
                / size;
            Cluster {
                id: slot as u64,
                centroid,
                scatter,
            }
        })
        .collect()
}

/// Mean over clusters of the worst scatter-to-separation ratio.
pub(super) fn davies_bouldin(
    points: &PointSet,
    labels: &ClusterLabeling,
    noise: NoiseTreatment,
    metric: &Minkowski,
) -> Result<f64, Undefined> {
    let clusters = summarise(points, labels, noise, metric);
    if clusters.len() < 2 {
        return Err(Undefined::TooFewClusters {
            clusters: clusters.len(),
        });
    }

    let mut total = 0.0;
    for left in &clusters {
        let mut worst = 0.0f64;
        for right in clusters.iter().filter(|right| right.id != left.id) {
            let separation = metric.evaluate(&left.centroid, &right.centroid);
            if separation == 0.0 {
                return Err(Undefined::CoincidentCentroids {
                    left: left.id,
                    right: right.id,
                });
            }
            worst = worst.max((left.scatter + right.scatter) / separation);
        }
        total += worst;
    }
    Ok(total / clusters.len() as f64)
}
