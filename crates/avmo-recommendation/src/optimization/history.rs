//! Applied-optimization history.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use avmo_common::Result;

use super::OptimizationRecord;

/// Per-user log of applied optimizations
#[async_trait]
pub trait OptimizationHistoryStore: Send + Sync {
    async fn append(&self, record: OptimizationRecord) -> Result<()>;

    /// Most recent first, at most `limit` entries
    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<OptimizationRecord>>;
}

#[derive(Debug, Default)]
pub struct MemoryOptimizationHistory {
    records: RwLock<HashMap<String, Vec<OptimizationRecord>>>,
}

impl MemoryOptimizationHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptimizationHistoryStore for MemoryOptimizationHistory {
    async fn append(&self, record: OptimizationRecord) -> Result<()> {
        self.records
            .write()
            .await
            .entry(record.user_id.clone())
            .or_insert_with(Vec::new)
            .push(record);
        Ok(())
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<OptimizationRecord>> {
        let records = self.records.read().await;
        let mut history = records.get(user_id).cloned().unwrap_or_default();
        history.reverse();
        history.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        history.truncate(limit);
        Ok(history)
    }
}
