use std::collections::BinaryHeap;

use hgrid_core::Point;

use crate::PathRange;
use crate::pathrange::{NodeRef, PathNode, UNREACHABLE};
use crate::traits::WeightedPather;

impl PathRange {
    /// Core priority-queue relaxation.
    ///
    /// Every source starts at cost 0. `on_settle` is called once per node
    /// when its distance becomes final; returning `true` stops the search.
    /// Settled nodes are never relaxed or expanded again.
    fn settle<P, F>(&mut self, pather: &P, sources: &[Point], max_cost: i32, mut on_settle: F)
    where
        P: WeightedPather,
        F: FnMut(usize, Point, i32) -> bool,
    {
        let cur_gen = self.next_generation();
        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();

        for &src in sources {
            let Some(si) = self.idx(src) else {
                continue;
            };
            let n = &mut self.nodes[si];
            if n.generation == cur_gen {
                continue;
            }
            n.g = 0;
            n.parent = usize::MAX;
            n.generation = cur_gen;
            n.closed = false;
            open.push(NodeRef { idx: si, g: 0 });
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);

        while let Some(current) = open.pop() {
            let ci = current.idx;
            let cn = &mut self.nodes[ci];
            // Stale heap entry for a node settled through a cheaper route.
            if cn.generation != cur_gen || cn.closed {
                continue;
            }
            cn.closed = true;
            let current_g = cn.g;
            let cp = self.point(ci);

            if on_settle(ci, cp, current_g) {
                break;
            }

            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative = current_g.saturating_add(pather.cost(cp, np));
                if tentative > max_cost {
                    continue;
                }

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    if n.closed || tentative >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                    n.closed = false;
                }

                n.g = tentative;
                n.parent = ci;
                open.push(NodeRef {
                    idx: ni,
                    g: tentative,
                });
            }
        }

        self.nbuf = nbuf;
    }

    /// Shortest path from `from` to `to`.
    ///
    /// The search stops as soon as `to` is settled. Returns the cost and the
    /// full path (both endpoints included), or `None` if `to` cannot be
    /// reached or either point is outside the range.
    pub fn dijkstra_path<P: WeightedPather>(
        &mut self,
        pather: &P,
        from: Point,
        to: Point,
    ) -> Option<(i32, Vec<Point>)> {
        self.idx(from)?;
        let goal = self.idx(to)?;

        let mut found = None;
        self.settle(pather, &[from], UNREACHABLE, |idx, _, g| {
            if idx == goal {
                found = Some(g);
                return true;
            }
            false
        });
        let cost = found?;

        let mut path = Vec::new();
        let mut ci = goal;
        while ci != usize::MAX {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        Some((cost, path))
    }

    /// Shortest distance from `from` to `to`, or [`UNREACHABLE`].
    pub fn dijkstra_distance<P: WeightedPather>(
        &mut self,
        pather: &P,
        from: Point,
        to: Point,
    ) -> i32 {
        if self.idx(from).is_none() {
            return UNREACHABLE;
        }
        let Some(goal) = self.idx(to) else {
            return UNREACHABLE;
        };

        let mut dist = UNREACHABLE;
        self.settle(pather, &[from], UNREACHABLE, |idx, _, g| {
            if idx == goal {
                dist = g;
                return true;
            }
            false
        });
        dist
    }

    /// Shortest distances from `from` to each of `targets`, in order.
    ///
    /// Runs a single search that stops once every target is settled.
    /// Targets that cannot be reached get [`UNREACHABLE`].
    pub fn dijkstra_targets<P: WeightedPather>(
        &mut self,
        pather: &P,
        from: Point,
        targets: &[Point],
    ) -> Vec<i32> {
        let mut out = vec![UNREACHABLE; targets.len()];
        if self.idx(from).is_none() {
            return out;
        }
        let goals: Vec<Option<usize>> = targets.iter().map(|&t| self.idx(t)).collect();
        let mut remaining = goals.iter().flatten().count();
        if remaining == 0 {
            return out;
        }

        self.settle(pather, &[from], UNREACHABLE, |idx, _, g| {
            for (k, goal) in goals.iter().enumerate() {
                if *goal == Some(idx) {
                    out[k] = g;
                    remaining -= 1;
                }
            }
            remaining == 0
        });
        out
    }

    /// Compute a multi-source Dijkstra distance map.
    ///
    /// Every source starts at cost 0. Expansion stops when the cumulative
    /// cost exceeds `max_cost`. Returns all reached nodes in settle order.
    pub fn dijkstra_map<P: WeightedPather>(
        &mut self,
        pather: &P,
        sources: &[Point],
        max_cost: i32,
    ) -> &[PathNode] {
        let mut map = std::mem::take(&mut self.map);
        let mut results = std::mem::take(&mut self.results);
        map.iter_mut().for_each(|v| *v = UNREACHABLE);
        results.clear();

        self.settle(pather, sources, max_cost, |idx, pos, g| {
            map[idx] = g;
            results.push(PathNode { pos, cost: g });
            false
        });

        self.map = map;
        self.results = results;
        &self.results
    }

    /// Query the Dijkstra cost at a specific point.
    ///
    /// Returns [`UNREACHABLE`] if the point is outside the range or was not
    /// reached by the last `dijkstra_map` call.
    pub fn dijkstra_at(&self, p: Point) -> i32 {
        match self.idx(p) {
            Some(i) => self.map[i],
            None => UNREACHABLE,
        }
    }
}
