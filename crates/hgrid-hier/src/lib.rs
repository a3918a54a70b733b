//! **hgrid-hier**: separator hierarchies and exact hierarchical distance
//! queries on weighted grids.
//!
//! The pieces, leaves first:
//!
//! - [`Decomposer`] splits the grid into a binary [`Hierarchy`] of
//!   subgraphs with straight median-cut [`Separator`]s, registering every
//!   level's separator vertices.
//! - [`PrecomputationEngine`] decides per decomposition node whether
//!   caching is worthwhile ([`admission`]) and, if so, stores distances
//!   from each separator vertex to a few [representatives](sampling) of the
//!   subgraph.
//! - [`DistanceCache`] keeps those distances in memory, writing through to
//!   an optional durable [`DistanceStore`] such as [`RedbStore`].
//! - [`PathFinder`] answers queries by trying separators as via-points at
//!   every level and always comparing against a plain Dijkstra at level 0,
//!   so results are exact no matter what was cached.
//!
//! ```no_run
//! use hgrid_core::{GridGraph, Point};
//! use hgrid_hier::{Decomposer, DistanceCache, HierarchyConfig, PathFinder, PrecomputationEngine};
//!
//! let graph = GridGraph::uniform(8, 8, 1);
//! let config = HierarchyConfig::default();
//! let cache = DistanceCache::in_memory();
//! let engine = PrecomputationEngine::new(&graph, &cache, &config);
//! let hierarchy = Decomposer::new(&graph).decompose_grid(&engine)?;
//!
//! let finder = PathFinder::new(&graph, &hierarchy, &cache);
//! assert_eq!(finder.distance(Point::new(0, 0), Point::new(7, 7)), 14);
//! # Ok::<(), hgrid_hier::Error>(())
//! ```

pub mod admission;
mod cache;
mod config;
mod decompose;
mod error;
mod finder;
mod key;
mod precompute;
pub mod sampling;
mod separator;
mod store;
mod subgraph;

pub use admission::Admission;
pub use cache::{CacheStats, DistanceCache};
pub use config::HierarchyConfig;
pub use decompose::{Decomposer, Hierarchy, SeparatorSink, SubgraphNode, max_level};
pub use error::{Error, Result};
pub use finder::{PathFinder, Route};
pub use key::PairKey;
pub use precompute::PrecomputationEngine;
pub use sampling::{NoSampling, SamplingPolicy, SeededSampler};
pub use separator::{Orientation, Separator};
pub use store::{DistanceStore, MemoryStore, RedbStore};
pub use subgraph::{Subgraph, SubgraphId};
