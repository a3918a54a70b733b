//! Shortest-path searches on weighted 2D grids.
//!
//! - **Point-to-point Dijkstra** with early exit and path reconstruction
//!   ([`PathRange::dijkstra_path`], [`PathRange::dijkstra_distance`])
//! - **Multi-target Dijkstra** from one source ([`PathRange::dijkstra_targets`])
//! - **Multi-source distance maps** ([`PathRange::dijkstra_map`]), used as
//!   ground truth by the hierarchy's tests
//!
//! All searches run through [`PathRange`], which owns and reuses its node
//! arrays so that repeated queries incur no allocations after warm-up.
//!
//! # Trait hierarchy
//!
//! | Trait | Provides |
//! |---|---|
//! | [`Pather`] | neighbour enumeration |
//! | [`WeightedPather`] : [`Pather`] | positive edge costs |

mod dijkstra;
mod pathrange;
mod traits;

pub use pathrange::{PathNode, PathRange, UNREACHABLE};
pub use traits::{Pather, WeightedPather};
