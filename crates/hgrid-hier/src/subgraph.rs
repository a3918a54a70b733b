//! Vertex sets for the nodes of the decomposition tree.

use hgrid_core::{Point, Range};

/// Stable identifier of a node in the [`Hierarchy`](crate::Hierarchy) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubgraphId(pub usize);

/// A set of grid vertices: sorted row-major, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subgraph {
    vertices: Vec<Point>,
}

impl Subgraph {
    /// Build a subgraph from any collection of vertices.
    pub fn new(mut vertices: Vec<Point>) -> Self {
        vertices.sort_unstable();
        vertices.dedup();
        Self { vertices }
    }

    /// Every vertex of `range`.
    pub fn from_range(range: Range) -> Self {
        // Range iteration is already row-major.
        Self {
            vertices: range.iter().collect(),
        }
    }

    /// Wrap vertices that are known to be sorted and unique.
    pub(crate) fn from_sorted(vertices: Vec<Point>) -> Self {
        debug_assert!(vertices.windows(2).all(|w| w[0] < w[1]));
        Self { vertices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn contains(&self, p: Point) -> bool {
        self.vertices.binary_search(&p).is_ok()
    }

    /// Smallest half-open range covering every vertex, `None` when empty.
    pub fn bounds(&self) -> Option<Range> {
        Range::bounding(self.vertices.iter().copied())
    }
}
