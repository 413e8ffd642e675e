#![allow(dead_code, reason = "each test binary uses a subset of these fixtures")]

use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tiscan_core::PointSet;
use tiscan_test_support::profile::ProptestRunProfile;

/// Builds a proptest configuration from the shared run profile.
#[must_use]
pub fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Three unit-square corners plus a distant outlier.
#[must_use]
pub fn square_with_outlier() -> PointSet {
    PointSet::new(
        2,
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![10.0, 10.0],
        ],
    )
    .expect("fixture rows are valid")
}

/// Seeded square blobs around `centres`, with each point's class label.
#[must_use]
pub fn blobs(seed: u64, centres: &[[f64; 2]], per_blob: usize, spread: f64) -> (PointSet, Vec<u64>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(centres.len() * per_blob);
    let mut truth = Vec::with_capacity(centres.len() * per_blob);
    for (class, centre) in centres.iter().enumerate() {
        for _ in 0..per_blob {
            rows.push(vec![
                centre[0] + rng.gen_range(-spread..=spread),
                centre[1] + rng.gen_range(-spread..=spread),
            ]);
            truth.push(class as u64);
        }
    }
    (PointSet::new(2, rows).expect("blob rows are valid"), truth)
}
