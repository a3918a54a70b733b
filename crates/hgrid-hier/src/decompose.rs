//! Recursive median-cut decomposition of the grid.
//!
//! The vertex set is split by straight separators into a binary tree of
//! subgraphs. Each node is stored in an arena ([`Hierarchy`]) and visited
//! through an explicit work stack, so deep trees do not grow the call stack.

use std::collections::{BTreeMap, BTreeSet};

use hgrid_core::{GridGraph, Point};
use rayon::prelude::*;

use crate::Result;
use crate::precompute::PrecomputationEngine;
use crate::separator::Separator;
use crate::subgraph::{Subgraph, SubgraphId};

/// `floor(log2(max(width, height)))`, or `0` for an empty grid.
pub fn max_level(width: i32, height: i32) -> u32 {
    let n = width.max(height);
    if n <= 0 { 0 } else { (n as u32).ilog2() }
}

/// Receives every separator vertex as it is registered.
pub trait SeparatorSink: Sync {
    fn mark_separator(&self, p: Point);
}

/// One node of the decomposition tree.
#[derive(Debug, Clone)]
pub struct SubgraphNode {
    pub id: SubgraphId,
    pub parent: Option<SubgraphId>,
    pub level: u32,
    pub subgraph: Subgraph,
    /// `None` for base cases.
    pub separator: Option<Separator>,
    /// `[part1, part2]`, present iff `separator` is.
    pub children: Option<[SubgraphId; 2]>,
}

/// The decomposition tree plus the separator vertices of every level.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    max_level: u32,
    nodes: Vec<SubgraphNode>,
    levels: BTreeMap<u32, BTreeSet<Point>>,
}

impl Hierarchy {
    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    #[inline]
    pub fn nodes(&self) -> &[SubgraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: SubgraphId) -> Option<&SubgraphNode> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> Option<&SubgraphNode> {
        self.nodes.first()
    }

    /// Union of all separators cut at `level`, across every branch.
    pub fn separators(&self, level: u32) -> Option<&BTreeSet<Point>> {
        self.levels.get(&level)
    }

    /// Levels that registered at least one separator.
    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    /// Total separator vertices over all levels.
    pub fn separator_count(&self) -> usize {
        self.levels.values().map(BTreeSet::len).sum()
    }

    fn register(&mut self, level: u32, separator: &Separator) {
        self.levels
            .entry(level)
            .or_default()
            .extend(separator.vertices().iter().copied());
    }
}

/// Builds a [`Hierarchy`] for a graph.
pub struct Decomposer<'a> {
    graph: &'a GridGraph,
    max_level: u32,
    sink: Option<&'a dyn SeparatorSink>,
}

impl<'a> Decomposer<'a> {
    pub fn new(graph: &'a GridGraph) -> Self {
        let size = graph.size();
        Self {
            graph,
            max_level: max_level(size.x, size.y),
            sink: None,
        }
    }

    /// Report separator vertices to `sink` (visualization, telemetry).
    pub fn with_sink(mut self, sink: &'a dyn SeparatorSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Build the tree without precomputing anything.
    pub fn split(&self, vertices: Subgraph) -> Hierarchy {
        self.build(vertices, |_| {})
    }

    /// Build the tree for the whole grid and precompute with `engine`.
    pub fn decompose_grid(&self, engine: &PrecomputationEngine<'_>) -> Result<Hierarchy> {
        self.decompose(Subgraph::from_range(self.graph.bounds()), engine)
    }

    /// Build the tree for `vertices` and precompute every node with `engine`.
    ///
    /// With a single worker each node is precomputed as soon as its
    /// separator is registered, before its children are visited. With more
    /// workers the tree is built first and the independent jobs run on a
    /// bounded thread pool.
    pub fn decompose(
        &self,
        vertices: Subgraph,
        engine: &PrecomputationEngine<'_>,
    ) -> Result<Hierarchy> {
        engine.config().validate()?;
        let workers = engine.config().workers;
        log::info!(
            "decomposing {} vertices, max level {}, {} worker(s)",
            vertices.len(),
            self.max_level,
            workers.max(1)
        );

        let hierarchy = if workers <= 1 {
            self.build(vertices, |node| precompute_node(engine, node))
        } else {
            let hierarchy = self.split(vertices);
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
            pool.install(|| {
                hierarchy
                    .nodes()
                    .par_iter()
                    .for_each(|node| precompute_node(engine, node));
            });
            hierarchy
        };

        log::info!(
            "decomposition done: {} nodes, {} separator vertices, {} cached distances",
            hierarchy.nodes.len(),
            hierarchy.separator_count(),
            engine.cache().len()
        );
        Ok(hierarchy)
    }

    fn build(&self, vertices: Subgraph, mut on_split: impl FnMut(&SubgraphNode)) -> Hierarchy {
        let mut hierarchy = Hierarchy {
            max_level: self.max_level,
            ..Default::default()
        };
        let mut stack = vec![(vertices, 0u32, None::<SubgraphId>)];

        while let Some((subgraph, level, parent)) = stack.pop() {
            let id = SubgraphId(hierarchy.nodes.len());
            log::debug!(
                "decomposing level {level} with subgraph size {}",
                subgraph.len()
            );

            let separator = if subgraph.len() <= 2 || level >= self.max_level {
                None
            } else {
                subgraph.bounds().and_then(Separator::through)
            };
            let Some(separator) = separator else {
                hierarchy.nodes.push(SubgraphNode {
                    id,
                    parent,
                    level,
                    subgraph,
                    separator: None,
                    children: None,
                });
                continue;
            };

            let (part1, part2) = separator.split(&subgraph);
            hierarchy.register(level, &separator);
            if let Some(sink) = self.sink {
                separator.vertices().iter().for_each(|&p| sink.mark_separator(p));
            }

            // part2's id depends on the size of part1's subtree;
            // `children` is filled in by `link_children`.
            hierarchy.nodes.push(SubgraphNode {
                id,
                parent,
                level,
                subgraph,
                separator: Some(separator),
                children: None,
            });
            on_split(&hierarchy.nodes[id.0]);

            stack.push((part2, level + 1, Some(id)));
            stack.push((part1, level + 1, Some(id)));
        }

        link_children(&mut hierarchy.nodes);
        hierarchy
    }
}

fn precompute_node(engine: &PrecomputationEngine<'_>, node: &SubgraphNode) {
    if let Some(sep) = &node.separator {
        engine.precompute(node.id, node.level, sep, &node.subgraph);
    }
}

/// Fill `children` from the `parent` links; the first child seen is part1.
fn link_children(nodes: &mut [SubgraphNode]) {
    let mut kids: Vec<Vec<SubgraphId>> = vec![Vec::new(); nodes.len()];
    for node in nodes.iter() {
        if let Some(parent) = node.parent {
            kids[parent.0].push(node.id);
        }
    }
    for (node, kids) in nodes.iter_mut().zip(kids) {
        if let [first, second] = kids[..] {
            node.children = Some([first, second]);
        }
    }
}
