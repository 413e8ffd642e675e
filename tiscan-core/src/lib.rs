//! Tiscan core library.
//!
//! Density-based clustering of static point sets: exact neighbour search
//! with triangle-inequality pruning, epsilon and reverse-nearest-neighbour
//! cluster expansion, and clustering validity metrics.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod cluster;
mod distance;
mod error;
mod labels;
mod neighbours;
mod pipeline;
mod point;
mod validity;

pub use crate::{
    builder::TiscanBuilder,
    cluster::{Algorithm, AlgorithmKind, DENSITY_FACTOR, run_clustering},
    distance::{DistanceError, Minkowski, minkowski_distance},
    error::{PointSetError, PointSetErrorCode, Result, TiscanError, TiscanErrorCode},
    labels::{ClusterId, ClusterLabeling, NonContiguousClusterIds},
    neighbours::{
        Neighbour, NeighbourQuery, ReferencePoint, SearchMode, SearchReport,
        run_neighbour_search,
    },
    pipeline::{RunReport, Tiscan},
    point::{Point, PointRole, PointSet},
    validity::{
        ExternalScores, NoiseTreatment, RoleCounts, Stats, ValidityOptions, compute_validity,
    },
};
