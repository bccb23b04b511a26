//! AVMo Recommendation - VM Optimization Analysis
//!
//! Threshold-based resource recommendations, an overall optimization score,
//! predictive scaling hints and a cost breakdown. Applying an optimization only records the
//! request in the history store; no VM is touched from here.
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//! License: MIT

use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use avmo_common::{AvmoError, Result};

use crate::config::OptimizationConfig;

pub mod cost;
pub mod history;
pub mod metrics;

pub use cost::{default_cost_analysis, CostAnalysis};
pub use history::{MemoryOptimizationHistory, OptimizationHistoryStore};
pub use metrics::{
    FixedMetricsSource, ForecastHorizon, RandomMetricsSource, ResourceSnapshot,
    SyntheticMetricsSource, UsageForecast,
};

const CPU_HIGH_USAGE: f64 = 80.0;
const CPU_LOW_USAGE: f64 = 20.0;
const MEMORY_HIGH_USAGE: f64 = 85.0;
const STORAGE_HIGH_USAGE: f64 = 90.0;
const NETWORK_HIGH_LATENCY_MS: f64 = 30.0;
const MEMORY_STEP_MB: u64 = 4096;
const STORAGE_STEP_MB: u64 = 128_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Storage,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// One actionable suggestion derived from a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendation {
    #[serde(rename = "type")]
    pub resource: ResourceKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub current_value: Value,
    pub recommended_value: Value,
    pub impact: String,
    pub estimated_improvement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationAnalysis {
    pub current: ResourceSnapshot,
    pub optimizations: Vec<OptimizationRecommendation>,
    /// 0 - 100
    pub score: u32,
    /// Set when `current` does not come from real measurements
    pub synthetic: bool,
    pub timestamp: DateTime<Utc>,
}

/// An applied optimization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecord {
    pub user_id: String,
    #[serde(rename = "type")]
    pub optimization_type: String,
    pub status: String,
    pub parameters: Value,
    pub applied_at: DateTime<Utc>,
    pub estimated_completion_time: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingRecommendation {
    pub timeframe: String,
    #[serde(rename = "type")]
    pub action: String,
    pub resource: ResourceKind,
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveScaling {
    pub next_hour: UsageForecast,
    pub next_4_hours: UsageForecast,
    pub next_24_hours: UsageForecast,
    pub recommendations: Vec<ScalingRecommendation>,
    pub synthetic: bool,
    pub last_analyzed: DateTime<Utc>,
}

/// Threshold-based suggestions for a snapshot
pub fn generate_recommendations(resources: &ResourceSnapshot) -> Vec<OptimizationRecommendation> {
    let mut recommendations = Vec::new();

    if resources.cpu.usage > CPU_HIGH_USAGE {
        recommendations.push(OptimizationRecommendation {
            resource: ResourceKind::Cpu,
            priority: Priority::High,
            title: "Increase CPU Allocation".to_string(),
            description: "Your CPU usage is consistently high. Consider allocating more cores."
                .to_string(),
            current_value: json!(resources.cpu.allocated_cores),
            recommended_value: json!(resources.cpu.allocated_cores + 2),
            impact: "performance".to_string(),
            estimated_improvement: "25-35%".to_string(),
        });
    } else if resources.cpu.usage < CPU_LOW_USAGE {
        recommendations.push(OptimizationRecommendation {
            resource: ResourceKind::Cpu,
            priority: Priority::Medium,
            title: "Reduce CPU Allocation".to_string(),
            description:
                "CPU resources are underutilized. You can reduce allocation to save costs."
                    .to_string(),
            current_value: json!(resources.cpu.allocated_cores),
            recommended_value: json!(resources.cpu.allocated_cores.saturating_sub(1).max(2)),
            impact: "cost".to_string(),
            estimated_improvement: "15-20% cost reduction".to_string(),
        });
    }

    if resources.memory.usage > MEMORY_HIGH_USAGE {
        recommendations.push(OptimizationRecommendation {
            resource: ResourceKind::Memory,
            priority: Priority::High,
            title: "Increase Memory Allocation".to_string(),
            description: "Memory usage is high. Increasing RAM will improve performance."
                .to_string(),
            current_value: json!(format!("{}MB", resources.memory.allocated_mb)),
            recommended_value: json!(format!(
                "{}MB",
                resources.memory.allocated_mb + MEMORY_STEP_MB
            )),
            impact: "performance".to_string(),
            estimated_improvement: "30-40%".to_string(),
        });
    }

    if resources.storage.usage > STORAGE_HIGH_USAGE {
        recommendations.push(OptimizationRecommendation {
            resource: ResourceKind::Storage,
            priority: Priority::High,
            title: "Expand Storage".to_string(),
            description: "Storage is nearly full. Consider expanding or cleaning up.".to_string(),
            current_value: json!(format!("{}GB", mb_to_gb(resources.storage.allocated_mb))),
            recommended_value: json!(format!(
                "{}GB",
                mb_to_gb(resources.storage.allocated_mb + STORAGE_STEP_MB)
            )),
            impact: "stability".to_string(),
            estimated_improvement: "Prevent storage issues".to_string(),
        });
    }

    if resources.network.latency_ms > NETWORK_HIGH_LATENCY_MS {
        recommendations.push(OptimizationRecommendation {
            resource: ResourceKind::Network,
            priority: Priority::Medium,
            title: "Optimize Network Configuration".to_string(),
            description:
                "Network latency is higher than optimal. Consider network optimization."
                    .to_string(),
            current_value: json!(format!("{}ms", resources.network.latency_ms.round())),
            recommended_value: json!("<20ms"),
            impact: "responsiveness".to_string(),
            estimated_improvement: "20-30% faster response".to_string(),
        });
    }

    recommendations
}

fn mb_to_gb(mb: u64) -> u64 {
    (mb as f64 / 1024.0).round() as u64
}

/// Overall optimization score, 0 - 100; lower usage and latency score higher
pub fn optimization_score(resources: &ResourceSnapshot) -> u32 {
    let scores = [
        (100.0 - resources.cpu.usage).max(0.0),
        (100.0 - resources.memory.usage).max(0.0),
        (100.0 - resources.storage.usage).max(0.0),
        (100.0 - resources.network.latency_ms * 2.0).max(0.0),
    ];
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().clamp(0.0, 100.0) as u32
}

/// Scale-up hints from forecasts
pub fn scaling_recommendations(
    next_hour: &UsageForecast,
    next_4_hours: &UsageForecast,
) -> Vec<ScalingRecommendation> {
    let mut recommendations = Vec::new();

    if next_hour.cpu > CPU_HIGH_USAGE {
        recommendations.push(ScalingRecommendation {
            timeframe: ForecastHorizon::NextHour.as_str().to_string(),
            action: "scale_up".to_string(),
            resource: ResourceKind::Cpu,
            reason: "High CPU usage predicted".to_string(),
            confidence: next_hour.confidence,
        });
    }

    if next_4_hours.memory > MEMORY_HIGH_USAGE {
        recommendations.push(ScalingRecommendation {
            timeframe: ForecastHorizon::Next4Hours.as_str().to_string(),
            action: "scale_up".to_string(),
            resource: ResourceKind::Memory,
            reason: "Memory pressure expected".to_string(),
            confidence: next_4_hours.confidence,
        });
    }

    recommendations
}

/// VM optimization analysis service
pub struct OptimizationAnalyzer {
    config: OptimizationConfig,
    metrics: Arc<dyn SyntheticMetricsSource>,
    history: Arc<dyn OptimizationHistoryStore>,
}

impl OptimizationAnalyzer {
    pub fn new(
        config: OptimizationConfig,
        metrics: Arc<dyn SyntheticMetricsSource>,
        history: Arc<dyn OptimizationHistoryStore>,
    ) -> Self {
        Self {
            config,
            metrics,
            history,
        }
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(AvmoError::BadRequest(
                "Optimization analysis is not enabled".to_string(),
            ))
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn analyze(&self, user_id: &str) -> Result<OptimizationAnalysis> {
        self.ensure_enabled()?;
        let start = Instant::now();

        let current = self.metrics.snapshot(user_id).await?;
        let optimizations = generate_recommendations(&current);
        let score = optimization_score(&current);

        debug!(
            "📊 Analyzed resources for {}: score {}, {} suggestions in {:?}",
            user_id,
            score,
            optimizations.len(),
            start.elapsed()
        );

        Ok(OptimizationAnalysis {
            current,
            optimizations,
            score,
            synthetic: self.metrics.is_synthetic(),
            timestamp: Utc::now(),
        })
    }

    #[instrument(level = "debug", skip(self, parameters))]
    pub async fn apply(
        &self,
        user_id: &str,
        optimization_type: &str,
        parameters: Option<Value>,
    ) -> Result<OptimizationRecord> {
        self.ensure_enabled()?;
        if optimization_type.trim().is_empty() {
            return Err(AvmoError::Validation(
                "Optimization type is required".to_string(),
            ));
        }

        let applied_at = Utc::now();
        let record = OptimizationRecord {
            user_id: user_id.to_string(),
            optimization_type: optimization_type.to_string(),
            status: "success".to_string(),
            parameters: parameters.unwrap_or_else(|| json!({})),
            applied_at,
            estimated_completion_time: applied_at + Duration::minutes(5),
            message: format!("{} optimization applied successfully", optimization_type),
        };

        self.history.append(record.clone()).await?;
        info!("⚙️ Recorded {} optimization for {}", optimization_type, user_id);
        Ok(record)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<OptimizationRecord>> {
        self.ensure_enabled()?;
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.default_history_limit);
        self.history.list(user_id, limit).await
    }

    /// Cost breakdown with the savings the optimizations would bring
    pub fn cost_analysis(&self) -> Result<CostAnalysis> {
        self.ensure_enabled()?;
        Ok(default_cost_analysis())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn predictive_scaling(&self, user_id: &str) -> Result<PredictiveScaling> {
        self.ensure_enabled()?;

        let next_hour = self.metrics.forecast(user_id, ForecastHorizon::NextHour).await?;
        let next_4_hours = self.metrics.forecast(user_id, ForecastHorizon::Next4Hours).await?;
        let next_24_hours = self.metrics.forecast(user_id, ForecastHorizon::Next24Hours).await?;
        let recommendations = scaling_recommendations(&next_hour, &next_4_hours);

        Ok(PredictiveScaling {
            next_hour,
            next_4_hours,
            next_24_hours,
            recommendations,
            synthetic: self.metrics.is_synthetic(),
            last_analyzed: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::metrics::{CpuUsage, MemoryUsage, NetworkUsage, StorageUsage};

    fn snapshot(cpu: f64, memory: f64, storage: f64, latency: f64) -> ResourceSnapshot {
        ResourceSnapshot {
            cpu: CpuUsage {
                allocated_cores: 4,
                usage: cpu,
                efficiency: 50.0,
            },
            memory: MemoryUsage {
                allocated_mb: 8192,
                usage: memory,
                efficiency: 50.0,
            },
            storage: StorageUsage {
                allocated_mb: 256_000,
                usage: storage,
                efficiency: 50.0,
            },
            network: NetworkUsage {
                bandwidth_mbps: 1000,
                usage: 10.0,
                latency_ms: latency,
            },
        }
    }

    fn analyzer(source: FixedMetricsSource) -> OptimizationAnalyzer {
        OptimizationAnalyzer::new(
            OptimizationConfig::default(),
            Arc::new(source),
            Arc::new(MemoryOptimizationHistory::new()),
        )
    }

    #[test]
    fn test_all_thresholds_exceeded() {
        let recs = generate_recommendations(&snapshot(95.0, 90.0, 95.0, 45.0));
        let kinds: Vec<_> = recs.iter().map(|r| r.resource).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Cpu,
                ResourceKind::Memory,
                ResourceKind::Storage,
                ResourceKind::Network
            ]
        );
        assert_eq!(recs[0].recommended_value, json!(6));
        assert_eq!(recs[1].recommended_value, json!("12288MB"));
        assert_eq!(recs[2].current_value, json!("250GB"));
        assert_eq!(recs[2].recommended_value, json!("375GB"));
        assert_eq!(recs[3].current_value, json!("45ms"));
    }

    #[test]
    fn test_low_cpu_suggests_reduction() {
        let recs = generate_recommendations(&snapshot(5.0, 50.0, 50.0, 10.0));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(recs[0].recommended_value, json!(3));
        assert_eq!(recs[0].impact, "cost");
    }

    #[test]
    fn test_healthy_snapshot_has_no_suggestions() {
        assert!(generate_recommendations(&snapshot(50.0, 50.0, 50.0, 10.0)).is_empty());
        // Thresholds are strict
        assert!(generate_recommendations(&snapshot(80.0, 85.0, 90.0, 30.0)).is_empty());
    }

    #[test]
    fn test_optimization_score() {
        assert_eq!(optimization_score(&snapshot(0.0, 0.0, 0.0, 0.0)), 100);
        assert_eq!(optimization_score(&snapshot(100.0, 100.0, 100.0, 60.0)), 0);
        // (60 + 40 + 20 + 80) / 4
        assert_eq!(optimization_score(&snapshot(40.0, 60.0, 80.0, 10.0)), 50);
    }

    #[tokio::test]
    async fn test_analyze_flags_synthetic_data() {
        let analyzer = analyzer(FixedMetricsSource {
            snapshot: snapshot(90.0, 10.0, 10.0, 5.0),
            forecast_cpu: 10.0,
            forecast_memory: 10.0,
        });
        let analysis = analyzer.analyze("u").await.unwrap();
        assert!(analysis.synthetic);
        assert_eq!(analysis.optimizations.len(), 1);
        assert_eq!(analysis.optimizations[0].title, "Increase CPU Allocation");
    }

    #[tokio::test]
    async fn test_apply_and_history() {
        let analyzer = analyzer(FixedMetricsSource {
            snapshot: snapshot(50.0, 50.0, 50.0, 10.0),
            forecast_cpu: 10.0,
            forecast_memory: 10.0,
        });

        let err = tokio_test::assert_err!(analyzer.apply("u", "", None).await);
        assert!(matches!(err, AvmoError::Validation(_)));

        let first = tokio_test::assert_ok!(analyzer.apply("u", "cpu", Some(json!({"cores": 6}))).await);
        assert_eq!(first.status, "success");
        assert_eq!(first.estimated_completion_time - first.applied_at, Duration::minutes(5));
        analyzer.apply("u", "memory", None).await.unwrap();
        analyzer.apply("other", "storage", None).await.unwrap();

        let history = analyzer.history("u", None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].optimization_type, "memory");
        assert_eq!(history[1].parameters, json!({"cores": 6}));

        assert_eq!(analyzer.history("u", Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_predictive_scaling() {
        let analyzer = analyzer(FixedMetricsSource {
            snapshot: snapshot(50.0, 50.0, 50.0, 10.0),
            forecast_cpu: 90.0,
            forecast_memory: 90.0,
        });
        let predictions = analyzer.predictive_scaling("u").await.unwrap();
        assert_eq!(predictions.recommendations.len(), 2);
        assert_eq!(predictions.recommendations[0].timeframe, "next_hour");
        assert_eq!(predictions.recommendations[1].resource, ResourceKind::Memory);
        assert_eq!(predictions.next_24_hours.confidence, 0.68);
    }

    #[tokio::test]
    async fn test_disabled_analyzer_rejects() {
        let analyzer = OptimizationAnalyzer::new(
            OptimizationConfig {
                enabled: false,
                ..OptimizationConfig::default()
            },
            Arc::new(RandomMetricsSource::new(OptimizationConfig::default())),
            Arc::new(MemoryOptimizationHistory::new()),
        );
        assert!(analyzer.analyze("u").await.is_err());
        assert!(matches!(analyzer.cost_analysis(), Err(AvmoError::BadRequest(_))));
    }
}
