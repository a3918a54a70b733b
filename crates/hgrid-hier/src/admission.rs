//! Deciding whether a (level, separator, subgraph) job is worth precomputing.
//!
//! Two tests must both pass:
//!
//! - **threshold**: `floor(ln total) - level + floor(ln subgraph)`, clamped to
//!   `[0, cap]`, must be at least `level`;
//! - **cost/benefit**: `subgraph²` potential queries must exceed
//!   `factor × subgraph × separator` work.

use crate::config::HierarchyConfig;

/// Outcome of the admission heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    /// The level is past the adjusted threshold.
    TooDeep { threshold: u32 },
    /// Too few potential queries for the precomputation cost.
    NotWorthwhile { potential_queries: u64, cost: u64 },
}

impl Admission {
    #[inline]
    pub fn is_admitted(self) -> bool {
        self == Admission::Admit
    }
}

/// `floor(ln n)`, with `ln 0` taken as `0`.
fn floor_ln(n: usize) -> i64 {
    if n == 0 {
        return 0;
    }
    (n as f64).ln().floor() as i64
}

/// The adjusted threshold, always within `[0, cap]`.
pub fn threshold(total_size: usize, level: u32, subgraph_size: usize, cap: u32) -> u32 {
    let raw = floor_ln(total_size) - i64::from(level) + floor_ln(subgraph_size);
    raw.clamp(0, i64::from(cap)) as u32
}

/// Whether `subgraph²` potential queries outweigh `factor × subgraph × separator`.
pub fn is_beneficial(subgraph_size: usize, separator_size: usize, factor: u64) -> bool {
    let (potential, cost) = benefit(subgraph_size, separator_size);
    potential > cost.saturating_mul(factor)
}

fn benefit(subgraph_size: usize, separator_size: usize) -> (u64, u64) {
    let n = subgraph_size as u64;
    (n.saturating_mul(n), n.saturating_mul(separator_size as u64))
}

/// Apply both tests.
pub fn evaluate(
    total_size: usize,
    level: u32,
    subgraph_size: usize,
    separator_size: usize,
    config: &HierarchyConfig,
) -> Admission {
    let threshold = threshold(total_size, level, subgraph_size, config.threshold_cap);
    if level > threshold {
        return Admission::TooDeep { threshold };
    }
    if !is_beneficial(subgraph_size, separator_size, config.benefit_factor) {
        let (potential_queries, cost) = benefit(subgraph_size, separator_size);
        return Admission::NotWorthwhile {
            potential_queries,
            cost,
        };
    }
    Admission::Admit
}
