use hgrid_core::{GridGraph, Point, Range};
use hgrid_hier::{
    Admission, Decomposer, DistanceCache, DistanceStore, HierarchyConfig, PathFinder,
    PrecomputationEngine, RedbStore, Separator, Subgraph, SubgraphId,
};
use hgrid_paths::{PathRange, UNREACHABLE};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

#[test]
fn uniform_8x8_corner_to_corner_is_14() {
    let graph = GridGraph::uniform(8, 8, 1);
    let config = HierarchyConfig::default();
    let cache = DistanceCache::in_memory();
    let engine = PrecomputationEngine::new(&graph, &cache, &config);
    let hierarchy = Decomposer::new(&graph).decompose_grid(&engine).unwrap();

    let finder = PathFinder::new(&graph, &hierarchy, &cache);
    assert_eq!(finder.distance(Point::new(0, 0), Point::new(7, 7)), 14);

    let route = finder.route(Point::new(0, 0), Point::new(7, 7));
    let cells = finder.expand(&route).unwrap();
    assert_eq!(cells.len(), 15);
}

#[test]
fn single_vertex_is_a_leaf() {
    let graph = GridGraph::uniform(8, 8, 1);
    let config = HierarchyConfig::default();
    let cache = DistanceCache::in_memory();
    let engine = PrecomputationEngine::new(&graph, &cache, &config);

    let hierarchy = Decomposer::new(&graph)
        .decompose(Subgraph::new(vec![Point::new(3, 3)]), &engine)
        .unwrap();
    assert_eq!(hierarchy.nodes().len(), 1);
    assert!(hierarchy.root().unwrap().separator.is_none());
    assert_eq!(hierarchy.levels().count(), 0);
    assert!(cache.is_empty());
}

#[test]
fn cost_benefit_boundary() {
    // 400 vertices in total, so the level-0 threshold is the cap.
    let graph = GridGraph::uniform(20, 20, 1);
    let config = HierarchyConfig::default();
    let cache = DistanceCache::in_memory();
    let engine = PrecomputationEngine::new(&graph, &cache, &config);

    // 20 vertices in a 10x10 box: the cut has 10 vertices and 400 > 2 x 200
    // does not hold.
    let sparse = Subgraph::new(
        Range::new(0, 0, 10, 10)
            .iter()
            .filter(|p| p.y == 0 || p.y == 9)
            .collect(),
    );
    assert_eq!(sparse.len(), 20);
    let cut = Separator::through(sparse.bounds().unwrap()).unwrap();
    assert_eq!(cut.len(), 10);
    assert_eq!(
        engine.precompute(SubgraphId(0), 0, &cut, &sparse),
        Admission::NotWorthwhile {
            potential_queries: 400,
            cost: 200
        }
    );
    assert!(cache.is_empty());

    // 20 vertices in a 5x5 box: a 5-vertex cut, 400 > 2 x 100.
    let dense = Subgraph::new(Range::new(0, 0, 5, 5).iter().filter(|p| p.y != 2).collect());
    assert_eq!(dense.len(), 20);
    let cut = Separator::through(dense.bounds().unwrap()).unwrap();
    assert_eq!(cut.len(), 5);
    assert_eq!(engine.precompute(SubgraphId(1), 0, &cut, &dense), Admission::Admit);
    assert!(!cache.is_empty());
}

#[test]
fn disconnected_region_is_unreachable_everywhere() {
    let mut graph = GridGraph::uniform(8, 8, 1);
    // Fence off the bottom-right 3x3 block.
    for i in 4..8 {
        graph.wall(Point::new(4, i));
        graph.wall(Point::new(i, 4));
    }
    let config = HierarchyConfig::default();
    let cache = DistanceCache::in_memory();
    let engine = PrecomputationEngine::new(&graph, &cache, &config);
    let hierarchy = Decomposer::new(&graph).decompose_grid(&engine).unwrap();
    let finder = PathFinder::new(&graph, &hierarchy, &cache);

    let (outside, inside) = (Point::new(0, 0), Point::new(6, 6));
    for level in 0..=hierarchy.max_level() {
        assert_eq!(finder.distance_at(outside, inside, level), UNREACHABLE);
    }
    assert_eq!(finder.distance(inside, Point::new(5, 7)), 2);
    assert_eq!(finder.distance(outside, Point::new(7, 0)), 7);
}

#[test]
fn durable_tier_repopulates_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("distances.redb");
    let graph = GridGraph::random(12, 12, &mut StdRng::seed_from_u64(8));
    let config = HierarchyConfig {
        seed: 3,
        ..Default::default()
    };
    let (a, b) = (Point::new(0, 11), Point::new(11, 0));

    let expected = {
        let store = RedbStore::open_for(&path, &graph).unwrap();
        let cache = DistanceCache::with_store(&store);
        let engine = PrecomputationEngine::new(&graph, &cache, &config);
        let hierarchy = Decomposer::new(&graph).decompose_grid(&engine).unwrap();
        let d = PathFinder::new(&graph, &hierarchy, &cache).distance(a, b);
        assert!(!cache.is_degraded());
        assert_eq!(store.records().unwrap().len(), cache.len());
        drop(engine);
        store.close();
        d
    };

    let store = RedbStore::open_for(&path, &graph).unwrap();
    let records = store.records().unwrap();
    assert!(!records.is_empty());

    // A fresh process: empty memory tier, same tree, no precomputation.
    let cache = DistanceCache::with_store(&store);
    let hierarchy = Decomposer::new(&graph).split(Subgraph::from_range(graph.bounds()));
    let (key, d) = records[0];
    assert_eq!(cache.get(key.second(), key.first(), key.level()), Some(d));

    let finder = PathFinder::new(&graph, &hierarchy, &cache);
    assert_eq!(finder.distance(a, b), expected);
    assert!(cache.stats().store_hits > 1);
}

#[test]
fn reused_store_never_serves_another_graphs_distances() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("distances.redb");
    let config = HierarchyConfig::default();
    let (a, b) = (Point::new(1, 1), Point::new(6, 5));

    let light = GridGraph::uniform(8, 8, 1);
    {
        let store = RedbStore::open_for(&path, &light).unwrap();
        let cache = DistanceCache::with_store(&store);
        let engine = PrecomputationEngine::new(&light, &cache, &config);
        let hierarchy = Decomposer::new(&light).decompose_grid(&engine).unwrap();
        assert_eq!(PathFinder::new(&light, &hierarchy, &cache).distance(a, b), 9);
        assert!(!store.records().unwrap().is_empty());
        drop(engine);
        store.close();
    }

    // Same file, same shape, every edge five times heavier.
    let heavy = GridGraph::uniform(8, 8, 5);
    let store = RedbStore::open_for(&path, &heavy).unwrap();
    assert!(store.records().unwrap().is_empty());

    // Without precomputation every answer comes from the store or a search.
    let cache = DistanceCache::with_store(&store);
    let hierarchy = Decomposer::new(&heavy).split(Subgraph::from_range(heavy.bounds()));
    let expected = PathRange::new(heavy.bounds()).dijkstra_distance(&heavy, a, b);
    assert_eq!(expected, 45);
    assert_eq!(PathFinder::new(&heavy, &hierarchy, &cache).distance(a, b), expected);

    let cache = DistanceCache::with_store(&store);
    let engine = PrecomputationEngine::new(&heavy, &cache, &config);
    let hierarchy = Decomposer::new(&heavy).decompose_grid(&engine).unwrap();
    assert_eq!(PathFinder::new(&heavy, &hierarchy, &cache).distance(a, b), expected);
    let records = store.records().unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|&(_, d)| d == UNREACHABLE || d % 5 == 0));
}

#[test]
fn separator_vertices_fall_in_the_second_part() {
    let graph = GridGraph::uniform(8, 8, 1);
    let hierarchy = Decomposer::new(&graph).split(Subgraph::from_range(graph.bounds()));

    let root = hierarchy.root().unwrap();
    let [c1, c2] = root.children.unwrap();
    let (p1, p2) = (
        &hierarchy.node(c1).unwrap().subgraph,
        &hierarchy.node(c2).unwrap().subgraph,
    );
    assert_eq!(p1.len(), 24);
    assert_eq!(p2.len(), 64 - p1.len());

    for node in hierarchy.nodes() {
        let (Some(sep), Some([c1, c2])) = (&node.separator, node.children) else {
            continue;
        };
        let p1 = &hierarchy.node(c1).unwrap().subgraph;
        let p2 = &hierarchy.node(c2).unwrap().subgraph;
        for &p in sep.vertices().iter().filter(|&&p| node.subgraph.contains(p)) {
            assert!(p2.contains(p), "{p} missing from the second part");
            assert!(!p1.contains(p));
        }
        assert_eq!(p1.len() + p2.len(), node.subgraph.len());
    }
}

#[test]
fn parallel_precomputation_answers_exactly() {
    let graph = GridGraph::random(16, 10, &mut StdRng::seed_from_u64(21));
    let config = HierarchyConfig {
        workers: 3,
        ..Default::default()
    };
    let cache = DistanceCache::in_memory();
    let engine = PrecomputationEngine::new(&graph, &cache, &config);
    let hierarchy = Decomposer::new(&graph).decompose_grid(&engine).unwrap();
    let finder = PathFinder::new(&graph, &hierarchy, &cache);

    let mut pr = PathRange::new(graph.bounds());
    for (a, b) in [
        (Point::new(0, 0), Point::new(15, 9)),
        (Point::new(8, 0), Point::new(7, 9)),
        (Point::new(2, 7), Point::new(13, 1)),
    ] {
        assert_eq!(finder.distance(a, b), pr.dijkstra_distance(&graph, a, b));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn hierarchical_distance_is_exact(
        w in 2i32..9,
        h in 2i32..9,
        seed in any::<u64>(),
        ax in 0i32..9, ay in 0i32..9,
        bx in 0i32..9, by in 0i32..9,
    ) {
        let graph = GridGraph::random_in(w, h, 1..=9, &mut StdRng::seed_from_u64(seed));
        let (a, b) = (Point::new(ax % w, ay % h), Point::new(bx % w, by % h));

        let config = HierarchyConfig { seed, ..Default::default() };
        let cache = DistanceCache::in_memory();
        let engine = PrecomputationEngine::new(&graph, &cache, &config);
        let hierarchy = Decomposer::new(&graph).decompose_grid(&engine).unwrap();
        let finder = PathFinder::new(&graph, &hierarchy, &cache);

        let mut pr = PathRange::new(graph.bounds());
        prop_assert_eq!(finder.distance(a, b), pr.dijkstra_distance(&graph, a, b));
        prop_assert_eq!(finder.distance(b, a), finder.distance(a, b));
    }
}
