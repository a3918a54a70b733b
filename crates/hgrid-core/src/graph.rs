//! A weighted 4-connected grid graph.
//!
//! [`GridGraph`] stores one positive weight per undirected edge between
//! cardinal neighbours, so `edge_weight(a, b) == edge_weight(b, a)` and
//! shortest-path distances are symmetric. Vertices can be walled off to
//! model disconnected regions.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::geom::{Point, Range};

/// Weighted grid of `width × height` vertices with origin `(0, 0)`.
///
/// Edge weights are fixed once the graph is handed to the hierarchy; all
/// precomputed distances assume they never change afterwards.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGraph {
    bounds: Range,
    /// Weight of the edge `p -> p + (1, 0)`, indexed by `p`. Unused in the
    /// last column.
    right: Vec<i32>,
    /// Weight of the edge `p -> p + (0, 1)`, indexed by `p`. Unused in the
    /// last row.
    down: Vec<i32>,
    walls: Vec<bool>,
}

impl GridGraph {
    /// Create a grid where every edge has the same `weight`.
    ///
    /// # Panics
    ///
    /// Panics if a dimension is negative or `weight` is not positive.
    pub fn uniform(width: i32, height: i32, weight: i32) -> Self {
        assert!(width >= 0 && height >= 0, "negative grid size {width}x{height}");
        assert!(weight > 0, "edge weights must be positive, got {weight}");
        let bounds = Range::new(0, 0, width, height);
        let len = bounds.len();
        Self {
            bounds,
            right: vec![weight; len],
            down: vec![weight; len],
            walls: vec![false; len],
        }
    }

    /// Create a grid with every edge weight drawn from `1..=2`.
    pub fn random(width: i32, height: i32, rng: &mut impl Rng) -> Self {
        Self::random_in(width, height, 1..=2, rng)
    }

    /// Create a grid with every edge weight drawn uniformly from `weights`.
    ///
    /// # Panics
    ///
    /// Panics if `weights` contains a non-positive value.
    pub fn random_in(
        width: i32,
        height: i32,
        weights: RangeInclusive<i32>,
        rng: &mut impl Rng,
    ) -> Self {
        assert!(*weights.start() > 0, "edge weights must be positive");
        let mut g = Self::uniform(width, height, *weights.start());
        for w in g.right.iter_mut().chain(g.down.iter_mut()) {
            *w = rng.random_range(weights.clone());
        }
        g
    }

    /// Grid dimensions as a `Point` (`x` = width, `y` = height).
    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    /// The rectangle covering every vertex.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the grid has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Whether `p` is a vertex of this grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Whether `p` has been walled off.
    pub fn is_wall(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.walls[i])
    }

    /// Remove every edge touching `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the grid.
    pub fn wall(&mut self, p: Point) {
        let i = self.expect_index(p);
        self.walls[i] = true;
    }

    /// Append the passable cardinal neighbours of `p` into `buf`.
    ///
    /// A walled vertex has no neighbours and is never listed as one.
    pub fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        if !self.contains(p) || self.is_wall(p) {
            return;
        }
        for n in p.neighbors_4() {
            if self.contains(n) && !self.is_wall(n) {
                buf.push(n);
            }
        }
    }

    /// Weight of the edge between two cardinal neighbours.
    ///
    /// # Panics
    ///
    /// Panics if either vertex is outside the grid or the two are not
    /// adjacent: such a query means the caller is broken.
    pub fn edge_weight(&self, a: Point, b: Point) -> i32 {
        let (table, at) = self.edge_slot(a, b);
        match table {
            Axis::Horizontal => self.right[at],
            Axis::Vertical => self.down[at],
        }
    }

    /// Overwrite the weight of the edge between two cardinal neighbours.
    ///
    /// # Panics
    ///
    /// Panics on non-adjacent or out-of-bounds vertices and on a
    /// non-positive weight.
    pub fn set_edge_weight(&mut self, a: Point, b: Point, weight: i32) {
        assert!(weight > 0, "edge weights must be positive, got {weight}");
        let (table, at) = self.edge_slot(a, b);
        match table {
            Axis::Horizontal => self.right[at] = weight,
            Axis::Vertical => self.down[at] = weight,
        }
    }

    /// Stable 64-bit digest of the dimensions, walls and every edge weight.
    ///
    /// Equal graphs have equal fingerprints on every platform and release,
    /// so a durable distance store can be tagged with the graph it was
    /// filled from. Weight slots past the last column or row are ignored.
    pub fn fingerprint(&self) -> u64 {
        let size = self.size();
        let mut h = Fnv1a::new();
        h.write(size.x);
        h.write(size.y);
        for (i, p) in self.bounds.iter().enumerate() {
            h.write(i32::from(self.walls[i]));
            if p.x + 1 < size.x {
                h.write(self.right[i]);
            }
            if p.y + 1 < size.y {
                h.write(self.down[i]);
            }
        }
        h.finish()
    }

    fn edge_slot(&self, a: Point, b: Point) -> (Axis, usize) {
        let ia = self.expect_index(a);
        let ib = self.expect_index(b);
        assert!(a.is_adjacent(b), "no edge between non-adjacent {a} and {b}");
        if a.y == b.y {
            (Axis::Horizontal, if a.x < b.x { ia } else { ib })
        } else {
            (Axis::Vertical, if a.y < b.y { ia } else { ib })
        }
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some((p.y * self.bounds.width() + p.x) as usize)
    }

    fn expect_index(&self, p: Point) -> usize {
        match self.index(p) {
            Some(i) => i,
            None => panic!("vertex {p} is outside the grid {}", self.bounds),
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// 64-bit FNV-1a over little-endian `i32`s.
struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn write(&mut self, v: i32) {
        for b in v.to_le_bytes() {
            self.0 = (self.0 ^ u64::from(b)).wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}
