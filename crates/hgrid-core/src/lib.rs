//! **hgrid-core**: geometry and the weighted grid graph.
//!
//! This crate provides the foundational types shared by the *hgrid*
//! crates: integer grid points, half-open rectangles, and a 4-connected
//! grid graph with positive, symmetric edge weights.

pub mod geom;
pub mod graph;

pub use geom::{Point, Range, RangeIter};
pub use graph::GridGraph;
