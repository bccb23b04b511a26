//! Feature usage log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use avmo_common::Result;

use crate::models::InteractionMetadata;

/// One use of a service feature (recommendations, optimization, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUsageRecord {
    pub user_id: String,
    pub feature: String,
    #[serde(default)]
    pub metadata: InteractionMetadata,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of feature usage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureUsageStore: Send + Sync {
    async fn append(&self, record: FeatureUsageRecord) -> Result<()>;

    /// Records with `timestamp >= since`, oldest first
    async fn records_since(&self, since: DateTime<Utc>) -> Result<Vec<FeatureUsageRecord>>;

    /// Drop records older than `cutoff`, returning how many were removed
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

#[derive(Debug, Default)]
pub struct MemoryFeatureUsageStore {
    records: RwLock<Vec<FeatureUsageRecord>>,
}

impl MemoryFeatureUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl FeatureUsageStore for MemoryFeatureUsageStore {
    async fn append(&self, record: FeatureUsageRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn records_since(&self, since: DateTime<Utc>) -> Result<Vec<FeatureUsageRecord>> {
        let records = self.records.read().await;
        let mut recent: Vec<_> = records
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect();
        recent.sort_by_key(|r| r.timestamp);
        Ok(recent)
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.timestamp >= cutoff);
        let removed = before - records.len();
        debug!("🧹 Purged {} feature usage records older than {}", removed, cutoff);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user: &str, feature: &str, age_hours: i64) -> FeatureUsageRecord {
        FeatureUsageRecord {
            user_id: user.to_string(),
            feature: feature.to_string(),
            metadata: Default::default(),
            timestamp: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[tokio::test]
    async fn test_records_since_and_purge() {
        let store = MemoryFeatureUsageStore::new();
        store.append(record("u", "chat", 1)).await.unwrap();
        store.append(record("u", "recommendations", 48)).await.unwrap();
        store.append(record("v", "optimization", 3)).await.unwrap();

        let recent = store
            .records_since(Utc::now() - Duration::hours(24))
            .await
            .unwrap();
        let features: Vec<_> = recent.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(features, vec!["optimization", "chat"]);

        let removed = store
            .purge_older_than(Utc::now() - Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 2);
    }
}
