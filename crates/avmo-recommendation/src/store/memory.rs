//! In-memory collaborator implementations
//!
//! Used by the default single-node deployment and throughout the test suite.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use avmo_common::Result;

use super::{CatalogProvider, InteractionStore, RecommendationCache};
use crate::catalog::fallback_catalog;
use crate::models::{AppRecord, InteractionRecord};

/// Interaction log keyed by user id
#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    records: RwLock<HashMap<String, Vec<InteractionRecord>>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all users
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn append(&self, record: InteractionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .entry(record.user_id.clone())
            .or_insert_with(Vec::new)
            .push(record);
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<InteractionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut records = self.records.write().await;
        let mut removed = 0;
        for user_records in records.values_mut() {
            let before = user_records.len();
            user_records.retain(|r| r.timestamp >= cutoff);
            removed += before - user_records.len();
        }
        records.retain(|_, user_records| !user_records.is_empty());
        debug!("🧹 Purged {} interaction records older than {}", removed, cutoff);
        Ok(removed)
    }
}

/// Catalog held in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    apps: RwLock<Vec<AppRecord>>,
}

impl MemoryCatalog {
    pub fn new(apps: Vec<AppRecord>) -> Self {
        Self {
            apps: RwLock::new(apps),
        }
    }

    /// Catalog seeded with the popular-apps list
    pub fn seeded() -> Self {
        Self::new(fallback_catalog())
    }

    pub async fn insert(&self, app: AppRecord) {
        self.apps.write().await.push(app);
    }

    pub async fn len(&self) -> usize {
        self.apps.read().await.len()
    }
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
    async fn apps_in_categories(
        &self,
        categories: &[String],
        exclude_owner: &str,
    ) -> Result<Vec<AppRecord>> {
        let apps = self.apps.read().await;
        Ok(apps
            .iter()
            .filter(|app| categories.contains(&app.category))
            .filter(|app| app.owner_id.as_deref() != Some(exclude_owner))
            .cloned()
            .collect())
    }
}

/// TTL cache for ranked lists
#[derive(Debug)]
pub struct MemoryRecommendationCache {
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, (Vec<AppRecord>, Instant)>>,
}

impl MemoryRecommendationCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RecommendationCache for MemoryRecommendationCache {
    async fn get(&self, key: &str) -> Option<Vec<AppRecord>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    async fn put(&self, key: &str, value: Vec<AppRecord>) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value, Instant::now()));

        if entries.len() > self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        }
        // Still over capacity: evict the oldest entries
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (_, stored_at))| *stored_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
