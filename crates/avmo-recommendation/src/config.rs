//! AVMo Recommendation - Configuration Module
//!
//! Settings for the recommendation engine and the VM optimization analyzer.
//! Every field has a default so partial configuration files stay valid.
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//! License: MIT

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recommendation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Label reported to clients alongside each recommendation list
    pub algorithm: String,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Number of preferred categories used to query the catalog
    pub top_categories: usize,
    /// Upper bound for each collaborator call
    pub store_timeout_ms: u64,
    /// Personalized list cache TTL; 0 disables caching
    pub cache_ttl_seconds: u64,
    pub cache_size: usize,
}

impl RecommendationConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_ttl_seconds > 0 && self.cache_size > 0
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            algorithm: "collaborative_filtering_v1".to_string(),
            default_limit: 10,
            max_limit: 100,
            top_categories: 3,
            store_timeout_ms: 2000,
            cache_ttl_seconds: 0,
            cache_size: 1000,
        }
    }
}

/// VM optimization analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    pub enabled: bool,
    pub default_history_limit: usize,
    /// Allocation reported by the synthetic metrics source
    pub cpu_cores: u32,
    pub memory_mb: u64,
    pub storage_mb: u64,
    pub bandwidth_mbps: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_history_limit: 20,
            cpu_cores: 4,
            memory_mb: 8192,
            storage_mb: 256_000,
            bandwidth_mbps: 1000,
        }
    }
}
