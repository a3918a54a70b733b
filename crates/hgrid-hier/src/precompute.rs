//! Selective precomputation of separator-to-representative distances.

use hgrid_core::GridGraph;
use hgrid_paths::PathRange;

use crate::admission::{self, Admission};
use crate::cache::DistanceCache;
use crate::config::HierarchyConfig;
use crate::sampling::{self, SamplingPolicy, SeededSampler};
use crate::separator::Separator;
use crate::subgraph::{Subgraph, SubgraphId};

/// Selectively caches separator-to-representative distances.
///
/// For every admitted job, one search over the whole graph runs from each
/// separator vertex and the distances to the subgraph's representatives
/// are written into the [`DistanceCache`].
pub struct PrecomputationEngine<'a> {
    graph: &'a GridGraph,
    cache: &'a DistanceCache<'a>,
    config: &'a HierarchyConfig,
    sampler: Box<dyn SamplingPolicy + 'a>,
}

impl<'a> PrecomputationEngine<'a> {
    /// An engine sampling representatives with `config.seed`.
    pub fn new(
        graph: &'a GridGraph,
        cache: &'a DistanceCache<'a>,
        config: &'a HierarchyConfig,
    ) -> Self {
        Self {
            graph,
            cache,
            config,
            sampler: Box::new(SeededSampler::new(config.seed)),
        }
    }

    pub fn with_sampler(mut self, sampler: impl SamplingPolicy + 'a) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    #[inline]
    pub fn config(&self) -> &HierarchyConfig {
        self.config
    }

    #[inline]
    pub fn cache(&self) -> &DistanceCache<'a> {
        self.cache
    }

    /// Precompute distances for one decomposition node, if admitted.
    ///
    /// `id` salts the representative sampling. The returned [`Admission`]
    /// only reports what happened; all results land in the cache.
    pub fn precompute(
        &self,
        id: SubgraphId,
        level: u32,
        separator: &Separator,
        subgraph: &Subgraph,
    ) -> Admission {
        let admission = admission::evaluate(
            self.graph.len(),
            level,
            subgraph.len(),
            separator.len(),
            self.config,
        );
        if !admission.is_admitted() {
            log::debug!(
                "skipped precomputation at level {level} for {} vertices: {admission:?}",
                subgraph.len()
            );
            return admission;
        }

        let reps = sampling::representatives(subgraph, self.config, &*self.sampler, id.0 as u64);
        let mut pr = PathRange::new(self.graph.bounds());
        let mut batch = Vec::with_capacity(separator.len() * reps.len());
        for &s in separator.vertices() {
            let dists = pr.dijkstra_targets(self.graph, s, &reps);
            batch.extend(reps.iter().zip(dists).map(|(&v, d)| (s, v, d)));
        }
        self.cache.put_batch(level, &batch);

        log::info!(
            "precomputed {} distances at level {level} ({} separator vertices, {} representatives)",
            batch.len(),
            separator.len(),
            reps.len()
        );
        admission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::NoSampling;
    use hgrid_core::{Point, Range};
    use hgrid_paths::UNREACHABLE;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_admitted_job_caches_exact_distances() {
        let graph = GridGraph::random(8, 8, &mut StdRng::seed_from_u64(5));
        let cache = DistanceCache::in_memory();
        let cfg = HierarchyConfig::default();
        let engine = PrecomputationEngine::new(&graph, &cache, &cfg).with_sampler(NoSampling);

        let sg = Subgraph::from_range(graph.bounds());
        let sep = Separator::through(graph.bounds()).unwrap();
        assert_eq!(engine.precompute(SubgraphId(0), 0, &sep, &sg), Admission::Admit);
        // 8 separator vertices × 4 corners.
        assert_eq!(cache.len(), 32);

        let mut pr = PathRange::new(graph.bounds());
        for &s in sep.vertices() {
            for corner in graph.bounds().corners() {
                assert_eq!(
                    cache.get(corner, s, 0),
                    Some(pr.dijkstra_distance(&graph, s, corner))
                );
            }
        }
    }

    #[test]
    fn test_rejected_job_writes_nothing() {
        let graph = GridGraph::uniform(8, 8, 1);
        let cache = DistanceCache::in_memory();
        let cfg = HierarchyConfig::default();
        let engine = PrecomputationEngine::new(&graph, &cache, &cfg);

        // A 2x2 corner block at level 3: threshold = 4 - 3 + 1 = 2.
        let sg = Subgraph::from_range(Range::new(0, 0, 2, 2));
        let sep = Separator::through(sg.bounds().unwrap()).unwrap();
        let outcome = engine.precompute(SubgraphId(9), 3, &sep, &sg);
        assert_eq!(outcome, Admission::TooDeep { threshold: 2 });
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unreachable_representatives_store_sentinel() {
        let mut graph = GridGraph::uniform(8, 8, 1);
        let corner = Point::new(7, 7);
        graph.wall(Point::new(6, 7));
        graph.wall(Point::new(7, 6));
        let cache = DistanceCache::in_memory();
        let cfg = HierarchyConfig::default();
        let engine = PrecomputationEngine::new(&graph, &cache, &cfg).with_sampler(NoSampling);

        let sg = Subgraph::from_range(graph.bounds());
        let sep = Separator::through(graph.bounds()).unwrap();
        engine.precompute(SubgraphId(0), 0, &sep, &sg);
        assert_eq!(cache.get(Point::new(0, 3), corner, 0), Some(UNREACHABLE));
    }
}
