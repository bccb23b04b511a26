//! AVMo Recommendation - Usage Analytics
//!
//! Feature usage tracking and the dashboard views built on it. Usage counts
//! come from tracked events only. Resource figures come from the synthetic
//! metrics source and are flagged as such.
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//! License: MIT

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use avmo_common::{AvmoError, Result};

use crate::models::InteractionMetadata;
use crate::optimization::{
    generate_recommendations, optimization_score, OptimizationHistoryStore, Priority,
    ResourceKind, ResourceSnapshot, SyntheticMetricsSource,
};

pub mod insights;
pub mod usage;

pub use insights::{default_insights, Insight, InsightsReport};
pub use usage::{FeatureUsageRecord, FeatureUsageStore, MemoryFeatureUsageStore};

/// Window used by `/analytics/features` when none is given
pub const DEFAULT_FEATURES_RANGE: &str = "7d";
/// Window used by `/analytics/dashboard` when none is given
pub const DEFAULT_DASHBOARD_RANGE: &str = "24h";

const MAX_RANGE_HOURS: u32 = 365 * 24;
const MAX_FEATURE_NAME_LEN: usize = 64;
const TOP_FEATURES: usize = 5;

const CPU_HIGH_USAGE: f64 = 80.0;
const CPU_ALERT_USAGE: f64 = 85.0;
const MEMORY_PRESSURE: f64 = 80.0;
const DEGRADED_USAGE: f64 = 90.0;
const NETWORK_OPTIMAL_LATENCY_MS: f64 = 20.0;

/// Look-back window written as `<count><unit>`, unit one of `h`, `d`, `w`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    label: String,
    hours: u32,
}

impl TimeRange {
    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.hours))
    }

    /// Start of the window ending now
    pub fn start(&self) -> DateTime<Utc> {
        Utc::now() - self.duration()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for TimeRange {
    type Err = AvmoError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        let invalid = || {
            AvmoError::Validation(format!(
                "timeRange must look like 24h, 7d or 4w (at most 365 days), got '{}'",
                label
            ))
        };
        if label.len() < 2 || !label.is_ascii() {
            return Err(invalid());
        }

        let (count, unit) = label.split_at(label.len() - 1);
        let count: u32 = count.parse().map_err(|_| invalid())?;
        let per_unit = match unit {
            "h" => 1,
            "d" => 24,
            "w" => 24 * 7,
            _ => return Err(invalid()),
        };
        let hours = count
            .checked_mul(per_unit)
            .filter(|hours| (1..=MAX_RANGE_HOURS).contains(hours))
            .ok_or_else(invalid)?;

        Ok(Self {
            label: label.to_string(),
            hours,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCount {
    pub feature: String,
    pub count: u64,
}

/// Usage counts over a set of tracked events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUsageStats {
    pub total_interactions: u64,
    pub unique_users: usize,
    pub features_used: BTreeMap<String, u64>,
    /// Most used first, ties by name
    pub top_features: Vec<FeatureCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUsageReport {
    pub usage: FeatureUsageStats,
    pub time_range: String,
    pub generated_at: DateTime<Utc>,
}

/// Point-in-time VM metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub network_latency: f64,
    pub timestamp: DateTime<Utc>,
}

impl SystemMetrics {
    fn from_snapshot(snapshot: &ResourceSnapshot) -> Self {
        Self {
            cpu_usage: snapshot.cpu.usage,
            memory_usage: snapshot.memory.usage,
            disk_usage: snapshot.storage.usage,
            network_latency: snapshot.network.latency_ms,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintPriority {
    High,
    Low,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceHint {
    #[serde(rename = "type")]
    pub resource: ResourceKind,
    pub message: String,
    pub priority: HintPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub current: SystemMetrics,
    pub status: HealthStatus,
    pub recommendations: Vec<PerformanceHint>,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInsight {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub impact: String,
    pub actionable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Features this user used inside the window
    pub feature_interactions: u64,
    pub features_used: usize,
    pub vm_efficiency_score: u32,
    pub optimizations_applied: usize,
    pub last_optimized: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: DashboardOverview,
    pub current: SystemMetrics,
    pub insights: Vec<DashboardInsight>,
    pub alerts: Vec<Alert>,
    pub time_range: String,
    pub synthetic: bool,
}

/// Count events per feature
pub fn summarize_usage(records: &[FeatureUsageRecord]) -> FeatureUsageStats {
    let mut features_used: BTreeMap<String, u64> = BTreeMap::new();
    let mut users = HashSet::new();
    for record in records {
        *features_used.entry(record.feature.clone()).or_insert(0) += 1;
        users.insert(record.user_id.as_str());
    }

    let mut top_features: Vec<FeatureCount> = features_used
        .iter()
        .map(|(feature, count)| FeatureCount {
            feature: feature.clone(),
            count: *count,
        })
        .collect();
    // BTreeMap order already breaks ties by name; the sort is stable
    top_features.sort_by(|a, b| b.count.cmp(&a.count));
    top_features.truncate(TOP_FEATURES);

    FeatureUsageStats {
        total_interactions: records.len() as u64,
        unique_users: users.len(),
        features_used,
        top_features,
    }
}

pub fn performance_hints(metrics: &SystemMetrics) -> Vec<PerformanceHint> {
    let memory_priority = if metrics.memory_usage > MEMORY_PRESSURE {
        HintPriority::High
    } else {
        HintPriority::Low
    };
    let cpu = if metrics.cpu_usage > CPU_HIGH_USAGE {
        PerformanceHint {
            resource: ResourceKind::Cpu,
            message: "CPU usage is high, consider scaling up".to_string(),
            priority: HintPriority::High,
        }
    } else {
        PerformanceHint {
            resource: ResourceKind::Cpu,
            message: "CPU usage is optimal".to_string(),
            priority: HintPriority::Info,
        }
    };

    vec![
        PerformanceHint {
            resource: ResourceKind::Memory,
            message: "Consider closing unused applications to free up memory".to_string(),
            priority: memory_priority,
        },
        cpu,
    ]
}

pub fn health_status(metrics: &SystemMetrics) -> HealthStatus {
    let usage = [metrics.cpu_usage, metrics.memory_usage, metrics.disk_usage];
    if usage.iter().any(|u| *u > DEGRADED_USAGE) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

pub fn alerts(metrics: &SystemMetrics) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if metrics.cpu_usage > CPU_ALERT_USAGE {
        alerts.push(Alert {
            id: "cpu_high".to_string(),
            level: AlertLevel::Warning,
            title: "High CPU Usage".to_string(),
            message: format!("CPU usage at {:.0}%", metrics.cpu_usage),
            severity: "medium".to_string(),
        });
    }
    if metrics.memory_usage > MEMORY_PRESSURE {
        alerts.push(Alert {
            id: "memory_low".to_string(),
            level: AlertLevel::Info,
            title: "Memory Optimization Available".to_string(),
            message: "Consider closing unused applications".to_string(),
            severity: "low".to_string(),
        });
    }
    if metrics.network_latency < NETWORK_OPTIMAL_LATENCY_MS {
        alerts.push(Alert {
            id: "network_optimal".to_string(),
            level: AlertLevel::Success,
            title: "Network Performance Optimal".to_string(),
            message: "All network connections running smoothly".to_string(),
            severity: "info".to_string(),
        });
    }
    alerts
}

/// Feature usage analytics and VM dashboards
pub struct AnalyticsService {
    usage: Arc<dyn FeatureUsageStore>,
    metrics: Arc<dyn SyntheticMetricsSource>,
    optimizations: Arc<dyn OptimizationHistoryStore>,
}

impl AnalyticsService {
    pub fn new(
        usage: Arc<dyn FeatureUsageStore>,
        metrics: Arc<dyn SyntheticMetricsSource>,
        optimizations: Arc<dyn OptimizationHistoryStore>,
    ) -> Self {
        Self {
            usage,
            metrics,
            optimizations,
        }
    }

    /// Log one feature use. Validation failures are returned; storage
    /// failures are logged and swallowed.
    #[instrument(level = "debug", skip(self, metadata))]
    pub async fn track(
        &self,
        user_id: &str,
        feature: &str,
        metadata: Option<InteractionMetadata>,
    ) -> Result<()> {
        let feature = feature.trim();
        if feature.is_empty() {
            return Err(AvmoError::Validation("Feature name is required".to_string()));
        }
        if feature.chars().count() > MAX_FEATURE_NAME_LEN {
            return Err(AvmoError::Validation(format!(
                "Feature name must be at most {} characters",
                MAX_FEATURE_NAME_LEN
            )));
        }

        let record = FeatureUsageRecord {
            user_id: user_id.to_string(),
            feature: feature.to_string(),
            metadata: metadata.unwrap_or_default(),
            timestamp: Utc::now(),
        };
        match self.usage.append(record).await {
            Ok(()) => debug!("📝 Tracked {} for {}", feature, user_id),
            Err(e) => warn!(
                user_id = %user_id,
                feature = %feature,
                error = %e,
                "⚠️ Failed to track feature usage"
            ),
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self, range), fields(range = %range))]
    pub async fn feature_usage(&self, range: &TimeRange) -> Result<FeatureUsageReport> {
        let records = self.usage.records_since(range.start()).await?;
        let usage = summarize_usage(&records);
        debug!(
            "📊 {} feature events from {} users in {}",
            usage.total_interactions, usage.unique_users, range
        );

        Ok(FeatureUsageReport {
            usage,
            time_range: range.to_string(),
            generated_at: Utc::now(),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn performance(&self, user_id: &str) -> Result<PerformanceReport> {
        let snapshot = self.metrics.snapshot(user_id).await?;
        let current = SystemMetrics::from_snapshot(&snapshot);

        Ok(PerformanceReport {
            status: health_status(&current),
            recommendations: performance_hints(&current),
            current,
            synthetic: self.metrics.is_synthetic(),
        })
    }

    #[instrument(level = "debug", skip(self, range), fields(range = %range))]
    pub async fn dashboard(&self, user_id: &str, range: &TimeRange) -> Result<Dashboard> {
        let since = range.start();
        let snapshot = self.metrics.snapshot(user_id).await?;
        let current = SystemMetrics::from_snapshot(&snapshot);

        let own_usage: Vec<FeatureUsageRecord> = self
            .usage
            .records_since(since)
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        let usage = summarize_usage(&own_usage);

        let applied: Vec<_> = self
            .optimizations
            .list(user_id, usize::MAX)
            .await?
            .into_iter()
            .filter(|r| r.applied_at >= since)
            .collect();

        let mut insights: Vec<DashboardInsight> = generate_recommendations(&snapshot)
            .into_iter()
            .map(|rec| DashboardInsight {
                kind: "optimization".to_string(),
                title: rec.title,
                message: rec.description,
                impact: match rec.priority {
                    Priority::High => "high".to_string(),
                    Priority::Medium => "medium".to_string(),
                },
                actionable: true,
            })
            .collect();
        if let Some(top) = usage.top_features.first() {
            insights.push(DashboardInsight {
                kind: "usage".to_string(),
                title: "Most Used Feature".to_string(),
                message: format!("{} used {} times in the last {}", top.feature, top.count, range),
                impact: "low".to_string(),
                actionable: false,
            });
        }

        info!(
            user_id = %user_id,
            insights = insights.len(),
            "📈 Dashboard built for the last {}",
            range
        );

        Ok(Dashboard {
            overview: DashboardOverview {
                feature_interactions: usage.total_interactions,
                features_used: usage.features_used.len(),
                vm_efficiency_score: optimization_score(&snapshot),
                optimizations_applied: applied.len(),
                last_optimized: applied.first().map(|r| r.applied_at),
            },
            alerts: alerts(&current),
            current,
            insights,
            time_range: range.to_string(),
            synthetic: self.metrics.is_synthetic(),
        })
    }

    pub fn insights(&self) -> InsightsReport {
        let insights = default_insights();
        InsightsReport {
            count: insights.len(),
            insights,
            last_analyzed: Utc::now(),
        }
    }
}
