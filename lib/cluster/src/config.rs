use cohort_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for batch clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Target members per cluster; `k = max(1, population / group_size)`
    pub group_size: usize,
    /// Seed for centroid initialization
    pub seed: u64,
    pub max_iterations: usize,
    /// Stop once no centroid moves further than this (Euclidean)
    pub tolerance: f32,
    /// Independently seeded runs; the lowest-inertia run wins
    pub n_init: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            group_size: 3,
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            n_init: 4,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            return Err(Error::InvalidConfig("group_size must be at least 1".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.n_init == 0 {
            return Err(Error::InvalidConfig("n_init must be at least 1".to_string()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Number of clusters for a population
    pub fn cluster_count(&self, population: usize) -> usize {
        (population / self.group_size.max(1)).max(1)
    }
}
