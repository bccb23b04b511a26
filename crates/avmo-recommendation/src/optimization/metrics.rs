//! Resource metrics sources for the optimization analyzer.
//!
//! No real VM instrumentation exists yet, so every source here is synthetic
//! and says so through [`SyntheticMetricsSource::is_synthetic`]. Responses
//! built from these numbers carry that flag to the client.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use avmo_common::Result;

use crate::config::OptimizationConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub allocated_cores: u32,
    /// Percent
    pub usage: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub allocated_mb: u64,
    pub usage: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub allocated_mb: u64,
    pub usage: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUsage {
    pub bandwidth_mbps: u32,
    pub usage: f64,
    pub latency_ms: f64,
}

/// Point-in-time resource usage of a user's VM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub cpu: CpuUsage,
    pub memory: MemoryUsage,
    pub storage: StorageUsage,
    pub network: NetworkUsage,
}

/// Forecast window for predictive scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastHorizon {
    NextHour,
    Next4Hours,
    Next24Hours,
}

impl ForecastHorizon {
    pub fn confidence(&self) -> f64 {
        match self {
            ForecastHorizon::NextHour => 0.85,
            ForecastHorizon::Next4Hours => 0.72,
            ForecastHorizon::Next24Hours => 0.68,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastHorizon::NextHour => "next_hour",
            ForecastHorizon::Next4Hours => "next_4_hours",
            ForecastHorizon::Next24Hours => "next_24_hours",
        }
    }
}

/// Predicted CPU and memory usage (percent) over a horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageForecast {
    pub cpu: f64,
    pub memory: f64,
    pub confidence: f64,
}

/// Supplier of resource numbers that are not real measurements
#[async_trait]
pub trait SyntheticMetricsSource: Send + Sync {
    /// Always true for implementations of this trait
    fn is_synthetic(&self) -> bool {
        true
    }

    async fn snapshot(&self, user_id: &str) -> Result<ResourceSnapshot>;

    async fn forecast(&self, user_id: &str, horizon: ForecastHorizon) -> Result<UsageForecast>;
}

/// Uniformly random usage figures over the configured allocation
#[derive(Debug, Clone)]
pub struct RandomMetricsSource {
    config: OptimizationConfig,
}

impl RandomMetricsSource {
    pub fn new(config: OptimizationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SyntheticMetricsSource for RandomMetricsSource {
    async fn snapshot(&self, _user_id: &str) -> Result<ResourceSnapshot> {
        let mut rng = rand::thread_rng();
        Ok(ResourceSnapshot {
            cpu: CpuUsage {
                allocated_cores: self.config.cpu_cores,
                usage: rng.gen_range(0.0..100.0),
                efficiency: rng.gen_range(0.0..100.0),
            },
            memory: MemoryUsage {
                allocated_mb: self.config.memory_mb,
                usage: rng.gen_range(0.0..100.0),
                efficiency: rng.gen_range(0.0..100.0),
            },
            storage: StorageUsage {
                allocated_mb: self.config.storage_mb,
                usage: rng.gen_range(0.0..100.0),
                efficiency: rng.gen_range(0.0..100.0),
            },
            network: NetworkUsage {
                bandwidth_mbps: self.config.bandwidth_mbps,
                usage: rng.gen_range(0.0..100.0),
                latency_ms: rng.gen_range(0.0..50.0),
            },
        })
    }

    async fn forecast(&self, _user_id: &str, horizon: ForecastHorizon) -> Result<UsageForecast> {
        let mut rng = rand::thread_rng();
        Ok(UsageForecast {
            cpu: rng.gen_range(0.0..100.0),
            memory: rng.gen_range(0.0..100.0),
            confidence: horizon.confidence(),
        })
    }
}

/// Replays one snapshot and one forecast for every request
#[derive(Debug, Clone)]
pub struct FixedMetricsSource {
    pub snapshot: ResourceSnapshot,
    pub forecast_cpu: f64,
    pub forecast_memory: f64,
}

#[async_trait]
impl SyntheticMetricsSource for FixedMetricsSource {
    async fn snapshot(&self, _user_id: &str) -> Result<ResourceSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn forecast(&self, _user_id: &str, horizon: ForecastHorizon) -> Result<UsageForecast> {
        Ok(UsageForecast {
            cpu: self.forecast_cpu,
            memory: self.forecast_memory,
            confidence: horizon.confidence(),
        })
    }
}
