//! Collaborator interfaces
//!
//! The engine never owns interaction history or catalog data; it reaches them
//! through these traits so production backends and in-memory test doubles can
//! be swapped freely.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use avmo_common::Result;

use crate::models::{AppRecord, CategoryTrend, InteractionRecord};

pub mod memory;
#[cfg(feature = "backend_postgresql")]
pub mod postgres;

pub use memory::{MemoryCatalog, MemoryInteractionStore, MemoryRecommendationCache};
#[cfg(feature = "backend_postgresql")]
pub use postgres::PostgresStore;

/// Append-mostly log of user-app interactions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append one record. Identical records are all kept.
    async fn append(&self, record: InteractionRecord) -> Result<()>;

    /// All interactions logged for `user_id`
    async fn history(&self, user_id: &str) -> Result<Vec<InteractionRecord>>;

    /// Drop records older than `cutoff`, returning how many were removed
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// Read-only source of candidate apps
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Apps in any of `categories` not owned by `exclude_owner`
    async fn apps_in_categories(
        &self,
        categories: &[String],
        exclude_owner: &str,
    ) -> Result<Vec<AppRecord>>;
}

/// Swappable per-user cache for ranked recommendation lists
#[async_trait]
pub trait RecommendationCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<AppRecord>>;

    async fn put(&self, key: &str, value: Vec<AppRecord>);

    async fn invalidate(&self, key: &str);
}

/// Source of trending category labels
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn trending_categories(&self) -> Result<Vec<CategoryTrend>>;
}
