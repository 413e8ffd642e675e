//! Cluster labels produced by the clustering engine.
//!
//! Labels are contiguous from one; [`ClusterId::NOISE`] (zero) marks points
//! that belong to no cluster.

use std::collections::HashSet;
use thiserror::Error;

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use tiscan_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// assert!(!id.is_noise());
/// assert!(ClusterId::NOISE.is_noise());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Label carried by points outside every cluster.
    pub const NOISE: Self = Self(0);

    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    /// Whether this is the noise label.
    #[must_use]
    pub const fn is_noise(self) -> bool {
        self.0 == 0
    }
}

/// Error returned when cluster identifiers do not form `1..=C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The assignments skip identifiers.
    #[error("cluster identifiers must be contiguous from 1 without gaps")]
    Gap,
    /// The assignments require identifiers beyond the host pointer width.
    #[error("cluster identifiers exceed or reach the host pointer-width limit")]
    Overflow,
}

/// Per-point cluster labels.
///
/// # Examples
/// ```
/// use tiscan_core::{ClusterId, ClusterLabeling};
///
/// let labels = ClusterLabeling::try_from_assignments(vec![
///     ClusterId::new(1),
///     ClusterId::NOISE,
///     ClusterId::new(2),
///     ClusterId::new(1),
/// ])
/// .expect("identifiers are contiguous");
/// assert_eq!(labels.cluster_count(), 2);
/// assert_eq!(labels.noise_count(), 1);
/// assert_eq!(labels.cluster_sizes(), vec![2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabeling {
    assignments: Vec<ClusterId>,
    cluster_count: usize,
}

impl ClusterLabeling {
    /// Attempts to build a labelling from raw assignments.
    ///
    /// Non-noise identifiers must cover `1..=C` with no gaps. An empty vector,
    /// or one holding only noise, yields `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::Gap`] when identifiers skip values
    /// and [`NonContiguousClusterIds::Overflow`] when they exceed the host
    /// pointer width.
    pub fn try_from_assignments(
        assignments: Vec<ClusterId>,
    ) -> Result<Self, NonContiguousClusterIds> {
        let mut seen = HashSet::new();
        let mut max_id = 0u64;
        for id in &assignments {
            let value = id.get();
            if value >= usize::MAX as u64 {
                return Err(NonContiguousClusterIds::Overflow);
            }
            if value != 0 {
                seen.insert(value);
                max_id = max_id.max(value);
            }
        }

        if seen.len() as u64 != max_id {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            assignments,
            cluster_count: seen.len(),
        })
    }

    /// Wraps assignments the clustering engine produced with ids `1..=cluster_count`.
    pub(crate) fn from_parts(assignments: Vec<ClusterId>, cluster_count: usize) -> Self {
        debug_assert!(
            assignments
                .iter()
                .all(|id| id.get() <= cluster_count as u64),
            "engine produced an id beyond its cluster count"
        );
        Self {
            assignments,
            cluster_count,
        }
    }

    /// Returns the label of every point in id order.
    #[must_use]
    pub fn assignments(&self) -> &[ClusterId] {
        &self.assignments
    }

    /// Label of point `id`, if it exists.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<ClusterId> {
        self.assignments.get(id).copied()
    }

    /// Number of labelled points, noise included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no points are labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of non-noise clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Number of points labelled as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.assignments.iter().filter(|id| id.is_noise()).count()
    }

    /// Member counts of clusters `1..=C`, indexed from zero.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for id in &self.assignments {
            if let Some(slot) = (id.get() as usize)
                .checked_sub(1)
                .and_then(|index| sizes.get_mut(index))
            {
                *slot += 1;
            }
        }
        sizes
    }
}
