use hgrid_core::{GridGraph, Point};

/// Neighbour enumeration for searches.
pub trait Pather {
    /// Append the vertices reachable in one step from `p` to `buf`.
    /// `buf` is cleared by the caller.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}

/// A [`Pather`] whose steps have positive costs.
pub trait WeightedPather: Pather {
    /// Cost of the step from `from` to the adjacent `to`; always positive.
    fn cost(&self, from: Point, to: Point) -> i32;
}

impl Pather for GridGraph {
    #[inline]
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        GridGraph::neighbors(self, p, buf);
    }
}

impl WeightedPather for GridGraph {
    #[inline]
    fn cost(&self, from: Point, to: Point) -> i32 {
        self.edge_weight(from, to)
    }
}
