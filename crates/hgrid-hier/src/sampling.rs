//! Representative vertices of a subgraph.
//!
//! Precomputation only targets a handful of vertices per subgraph: the
//! bounding-box corners plus a few sampled ones. Sampling goes through a
//! [`SamplingPolicy`] so runs are reproducible for a given seed.

use std::collections::BTreeSet;

use hgrid_core::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HierarchyConfig;
use crate::subgraph::Subgraph;

/// Chooses extra representative vertices.
pub trait SamplingPolicy: Send + Sync {
    /// Pick up to `count` vertices from `vertices` (duplicates allowed).
    ///
    /// `salt` identifies the subgraph; the same inputs must give the same
    /// picks regardless of which thread asks.
    fn sample(&self, vertices: &[Point], count: usize, salt: u64) -> Vec<Point>;
}

/// Uniform sampling with replacement from a seeded [`StdRng`].
#[derive(Debug, Clone, Copy)]
pub struct SeededSampler {
    seed: u64,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SamplingPolicy for SeededSampler {
    fn sample(&self, vertices: &[Point], count: usize, salt: u64) -> Vec<Point> {
        if vertices.is_empty() {
            return Vec::new();
        }
        let mut rng = StdRng::seed_from_u64(self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        (0..count)
            .map(|_| vertices[rng.random_range(0..vertices.len())])
            .collect()
    }
}

/// Corners only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSampling;

impl SamplingPolicy for NoSampling {
    fn sample(&self, _vertices: &[Point], _count: usize, _salt: u64) -> Vec<Point> {
        Vec::new()
    }
}

/// Bounding-box corners plus `min(extra_samples, len / sample_divisor)`
/// sampled vertices, sorted and without duplicates.
pub fn representatives(
    subgraph: &Subgraph,
    config: &HierarchyConfig,
    sampler: &dyn SamplingPolicy,
    salt: u64,
) -> Vec<Point> {
    let Some(bounds) = subgraph.bounds() else {
        return Vec::new();
    };
    let extra = config
        .extra_samples
        .min(subgraph.len() / config.sample_divisor.max(1));

    let mut reps: BTreeSet<Point> = bounds.corners().into_iter().collect();
    reps.extend(sampler.sample(subgraph.vertices(), extra, salt));
    reps.into_iter().collect()
}
