//! Straight median cuts through a subgraph's bounding box.

use std::cmp::Ordering;

use hgrid_core::{Point, Range};

use crate::subgraph::Subgraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// A column of vertices at a fixed `x`.
    Vertical,
    /// A row of vertices at a fixed `y`.
    Horizontal,
}

/// A single vertical or horizontal line of vertices cutting a subgraph in two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    orientation: Orientation,
    coord: i32,
    vertices: Vec<Point>,
}

impl Separator {
    /// The median cut through `bounds`.
    ///
    /// The cut is vertical when the box is wider than tall, horizontal
    /// otherwise, and covers every grid vertex of that line inside the box.
    /// Returns `None` for an empty box.
    pub fn through(bounds: Range) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let (x0, x1) = (bounds.min.x, bounds.max.x - 1);
        let (y0, y1) = (bounds.min.y, bounds.max.y - 1);

        let sep = if x1 - x0 > y1 - y0 {
            let mid = (x0 + x1).div_euclid(2);
            Self {
                orientation: Orientation::Vertical,
                coord: mid,
                vertices: (y0..=y1).map(|y| Point::new(mid, y)).collect(),
            }
        } else {
            let mid = (y0 + y1).div_euclid(2);
            Self {
                orientation: Orientation::Horizontal,
                coord: mid,
                vertices: (x0..=x1).map(|x| Point::new(x, mid)).collect(),
            }
        };
        Some(sep)
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The fixed `x` (vertical) or `y` (horizontal) of the cut.
    #[inline]
    pub fn coord(&self) -> i32 {
        self.coord
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `Less` left of / above the cut, `Equal` on it, `Greater` past it.
    #[inline]
    pub fn side(&self, p: Point) -> Ordering {
        match self.orientation {
            Orientation::Vertical => p.x.cmp(&self.coord),
            Orientation::Horizontal => p.y.cmp(&self.coord),
        }
    }

    /// Split `subgraph` into the vertices strictly before the cut and the
    /// rest. Vertices on the cut go to the second part.
    pub fn split(&self, subgraph: &Subgraph) -> (Subgraph, Subgraph) {
        let (part1, part2): (Vec<Point>, Vec<Point>) = subgraph
            .vertices()
            .iter()
            .copied()
            .partition(|&p| self.side(p) == Ordering::Less);
        (Subgraph::from_sorted(part1), Subgraph::from_sorted(part2))
    }
}
