//! Neighbour search benchmarks.
//!
//! Compares the brute-force and reference-pruned strategies on the same
//! seeded blobs, for both `k`-nearest and epsilon queries.
#![allow(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![allow(
    clippy::excessive_nesting,
    reason = "Criterion bench_with_input + iter_batched pattern requires deep nesting"
)]

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

use tiscan_benches::{
    blobs::{BlobConfig, BlobError, generate_blobs},
    params::SearchBenchParams,
};
use tiscan_core::{Minkowski, NeighbourQuery, SearchMode, run_neighbour_search};

/// Seed used for all blob generation in this benchmark.
const SEED: u64 = 42;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[250, 1_000, 4_000];

/// Dimensionalities to benchmark.
const DIMENSIONS: &[usize] = &[2, 8];

const MODES: [SearchMode; 2] = [SearchMode::BruteForce, SearchMode::Pruned];

fn search_group_impl(
    c: &mut Criterion,
    group_name: &str,
    query: NeighbourQuery,
) -> Result<(), BlobError> {
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);

    for &dimensions in DIMENSIONS {
        for &point_count in POINT_COUNTS {
            let (points, _) = generate_blobs(&BlobConfig {
                point_count,
                dimensions,
                cluster_count: 4,
                separation: 20.0,
                spread: 1.0,
                seed: SEED,
            })?;
            let params = SearchBenchParams {
                point_count,
                dimensions,
            };

            for mode in MODES {
                group.bench_with_input(
                    BenchmarkId::new(mode.as_str(), &params),
                    &points,
                    |b, points| {
                        b.iter_batched(
                            || points.clone(),
                            |mut points| {
                                if let Err(err) = run_neighbour_search(
                                    &mut points,
                                    mode,
                                    query,
                                    &Minkowski::EUCLIDEAN,
                                ) {
                                    panic!("neighbour search failed during benchmark: {err}");
                                }
                                points
                            },
                            BatchSize::SmallInput,
                        );
                    },
                );
            }
        }
    }

    group.finish();
    Ok(())
}

fn knn_search(c: &mut Criterion) {
    if let Err(err) = search_group_impl(c, "knn", NeighbourQuery::Knn { k: 8 }) {
        panic!("knn benchmark setup failed: {err}");
    }
}

fn epsilon_search(c: &mut Criterion) {
    if let Err(err) = search_group_impl(c, "epsilon", NeighbourQuery::Epsilon { eps: 2.0 }) {
        panic!("epsilon benchmark setup failed: {err}");
    }
}

criterion_group!(benches, knn_search, epsilon_search);
criterion_main!(benches);
