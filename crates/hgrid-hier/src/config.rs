use crate::{Error, Result};

/// Tuning knobs for decomposition, precomputation and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HierarchyConfig {
    /// Upper clamp for the admission threshold.
    pub threshold_cap: u32,
    /// Precompute only if `size² > benefit_factor × size × separator`.
    pub benefit_factor: u64,
    /// Maximum number of sampled representatives per subgraph.
    pub extra_samples: usize,
    /// One sampled representative per this many subgraph vertices.
    pub sample_divisor: usize,
    /// Seed for representative sampling.
    pub seed: u64,
    /// Precomputation workers; `1` runs inline during decomposition.
    pub workers: usize,
    /// Write lazily resolved query segments back into the cache.
    pub memoize_queries: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            threshold_cap: 5,
            benefit_factor: 2,
            extra_samples: 5,
            sample_divisor: 10,
            seed: 0,
            workers: 1,
            memoize_queries: true,
        }
    }
}

impl HierarchyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_divisor == 0 {
            return Err(Error::InvalidConfig("sample_divisor must be positive".into()));
        }
        if self.benefit_factor == 0 {
            return Err(Error::InvalidConfig("benefit_factor must be positive".into()));
        }
        if self.threshold_cap > 31 {
            return Err(Error::InvalidConfig(format!(
                "threshold_cap {} exceeds the deepest possible level",
                self.threshold_cap
            )));
        }
        Ok(())
    }
}
