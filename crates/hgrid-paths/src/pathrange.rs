use std::cmp::Ordering;

use hgrid_core::{Point, Range};

/// Distance returned for vertices no search can reach.
pub const UNREACHABLE: i32 = i32::MAX;

/// A settled vertex and its distance, as listed by
/// [`PathRange::dijkstra_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    pub cost: i32,
}

/// Per-vertex search state. Only valid when `generation` matches the
/// owning [`PathRange`]'s current one.
#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) closed: bool,
}

impl Node {
    const FRESH: Node = Node {
        g: 0,
        parent: usize::MAX,
        generation: 0,
        closed: false,
    };
}

/// Heap entry; the max-heap pops the lowest `g` first.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) g: i32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.g, other.idx).cmp(&(self.g, self.idx))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable search space over a box of the grid.
///
/// Node arrays are allocated once and invalidated lazily by bumping a
/// generation counter, so back-to-back searches do not clear or allocate.
/// A `PathRange` is owned by a single query or worker; it is never shared.
pub struct PathRange {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) map: Vec<i32>,
    pub(crate) results: Vec<PathNode>,
    pub(crate) nbuf: Vec<Point>,
}

impl PathRange {
    pub fn new(rng: Range) -> Self {
        let len = rng.len();
        Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes: vec![Node::FRESH; len],
            generation: 0,
            map: vec![UNREACHABLE; len],
            results: Vec::new(),
            nbuf: Vec::with_capacity(4),
        }
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    /// Begin a search. On wrap-around every node is reset, since a stale
    /// node could otherwise carry the new generation number.
    pub(crate) fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::FRESH);
            self.generation = 1;
        }
        self.generation
    }

    /// Flat index of `p`, `None` outside the box.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        self.rng.contains(p).then(|| {
            let dx = (p.x - self.rng.min.x) as usize;
            let dy = (p.y - self.rng.min.y) as usize;
            dy * self.width + dx
        })
    }

    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        Point::new(
            self.rng.min.x + (idx % self.width) as i32,
            self.rng.min.y + (idx / self.width) as i32,
        )
    }
}
