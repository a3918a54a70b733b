//! Exact distance queries over a [`Hierarchy`].
//!
//! A query starts at the deepest level and walks toward the root. At each
//! level every separator vertex is tried as a via-point, with both halves
//! taken from the cache or resolved one level down, and the result is
//! compared against the same query one level down. Level 0 is a plain
//! Dijkstra over the whole graph, so the answer is always exact.

use hgrid_core::{GridGraph, Point};
use hgrid_paths::{PathRange, UNREACHABLE};

use crate::cache::DistanceCache;
use crate::decompose::Hierarchy;

/// The answer to a query: its distance and the vertices it passes through.
///
/// Consecutive waypoints are joined by a shortest path, but are not
/// necessarily adjacent: a cached hop contributes only its endpoints. Use
/// [`PathFinder::expand`] to get every cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub distance: i32,
    pub waypoints: Vec<Point>,
}

impl Route {
    pub fn unreachable() -> Self {
        Self {
            distance: UNREACHABLE,
            waypoints: Vec::new(),
        }
    }

    fn single(p: Point) -> Self {
        Self {
            distance: 0,
            waypoints: vec![p],
        }
    }

    fn hop(from: Point, to: Point, distance: i32) -> Self {
        if distance == UNREACHABLE {
            return Self::unreachable();
        }
        Self {
            distance,
            waypoints: vec![from, to],
        }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.distance != UNREACHABLE
    }

    /// Concatenate two routes sharing a junction vertex, kept once.
    fn join(mut self, next: Route) -> Route {
        debug_assert_eq!(self.waypoints.last(), next.waypoints.first());
        self.distance = self.distance.saturating_add(next.distance);
        self.waypoints.extend(next.waypoints.into_iter().skip(1));
        self
    }
}

/// Answers point-to-point queries.
///
/// Holds only shared references, so one finder can serve queries from many
/// threads; each query allocates its own search space.
pub struct PathFinder<'a> {
    graph: &'a GridGraph,
    hierarchy: &'a Hierarchy,
    cache: &'a DistanceCache<'a>,
    memoize: bool,
}

impl<'a> PathFinder<'a> {
    pub fn new(
        graph: &'a GridGraph,
        hierarchy: &'a Hierarchy,
        cache: &'a DistanceCache<'a>,
    ) -> Self {
        Self {
            graph,
            hierarchy,
            cache,
            memoize: true,
        }
    }

    /// Whether segments resolved during queries are written to the cache.
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Exact shortest distance from `source` to `target`, or [`UNREACHABLE`].
    ///
    /// # Panics
    ///
    /// Panics if either point is outside the grid.
    pub fn distance(&self, source: Point, target: Point) -> i32 {
        self.route(source, target).distance
    }

    /// Like [`distance`](Self::distance), but starting the walk at `level`.
    pub fn distance_at(&self, source: Point, target: Point, level: u32) -> i32 {
        self.check(source, target);
        let mut pr = PathRange::new(self.graph.bounds());
        self.resolve(source, target, level, &mut pr).distance
    }

    /// Exact shortest route from `source` to `target`.
    ///
    /// # Panics
    ///
    /// Panics if either point is outside the grid.
    pub fn route(&self, source: Point, target: Point) -> Route {
        self.check(source, target);
        let mut pr = PathRange::new(self.graph.bounds());
        let route = self.resolve(source, target, self.hierarchy.max_level(), &mut pr);
        log::debug!(
            "query {source} -> {target}: distance {} via {} waypoints",
            route.distance,
            route.waypoints.len()
        );
        route
    }

    /// Every cell of `route`, filling the gaps between waypoints with exact
    /// searches. `None` for an unreachable route.
    pub fn expand(&self, route: &Route) -> Option<Vec<Point>> {
        let (&first, rest) = route.waypoints.split_first()?;
        let mut pr = PathRange::new(self.graph.bounds());
        let mut cells = vec![first];
        let mut from = first;
        for &to in rest {
            let (_, leg) = pr.dijkstra_path(self.graph, from, to)?;
            cells.extend(leg.into_iter().skip(1));
            from = to;
        }
        Some(cells)
    }

    fn check(&self, source: Point, target: Point) {
        assert!(self.graph.contains(source), "source {source} is outside the grid");
        assert!(self.graph.contains(target), "target {target} is outside the grid");
    }

    fn resolve(&self, a: Point, b: Point, level: u32, pr: &mut PathRange) -> Route {
        if a == b {
            return Route::single(a);
        }
        if level == 0 {
            return match pr.dijkstra_path(self.graph, a, b) {
                Some((distance, waypoints)) => Route { distance, waypoints },
                None => Route::unreachable(),
            };
        }

        let mut best = self.resolve(a, b, level - 1, pr);
        let Some(separators) = self.hierarchy.separators(level) else {
            return best;
        };
        for &s in separators {
            // A via-point on an endpoint is the lower-level query again.
            if s == a || s == b {
                continue;
            }
            let first = self.segment(a, s, level, pr);
            // Weights are positive: a longer prefix cannot win.
            if first.distance >= best.distance {
                continue;
            }
            let second = self.segment(s, b, level, pr);
            if first.distance.saturating_add(second.distance) < best.distance {
                best = first.join(second);
            }
        }
        best
    }

    /// `dist(a, b, level)`: the cache, or a fresh query one level down.
    fn segment(&self, a: Point, b: Point, level: u32, pr: &mut PathRange) -> Route {
        if let Some(d) = self.cache.get(a, b, level) {
            return Route::hop(a, b, d);
        }
        let route = self.resolve(a, b, level - 1, pr);
        if self.memoize {
            self.cache.put(a, b, level, route.distance);
        }
        route
    }
}
