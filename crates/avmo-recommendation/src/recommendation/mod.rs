// =============================================================================
// AVMo AI Service - Recommendation Engine Module
// =============================================================================
//
// Project: ShaydZ AVMo - Virtual Mobile Device Platform
// Contributors: AVMo Development Team
// Version: 0.1.0
// License: MIT
//
// Description:
//   Personalized app recommendations ranked from a user's interaction history.
//   The read path is total: any collaborator failure, timeout or empty
//   personalization serves the static popular-apps list instead.
//
// =============================================================================

use std::{collections::HashMap, future::Future, sync::Arc, time::Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use avmo_common::{AvmoError, Result};

use crate::catalog::{default_trending_categories, fallback_catalog, StaticTrendingSource};
use crate::config::RecommendationConfig;
use crate::models::{
    AppRecord, CategoryTrend, FallbackReason, InteractionMetadata, InteractionRecord,
    InteractionType, RecommendationOutcome, RecommendationSource, RecommendationStats,
    TrendingCategories,
};
use crate::store::{CatalogProvider, InteractionStore, RecommendationCache, TrendingSource};

pub mod ranking;

pub use ranking::{compare_apps, derive_category_preferences, rank_candidates, top_categories};

/// Metadata key carrying the app category
pub const METADATA_CATEGORY: &str = "category";
/// Metadata key carrying the usage duration
pub const METADATA_USAGE_TIME: &str = "usageTime";

/// Recommendation Engine Service
pub struct RecommendationEngine {
    /// Configuration
    config: RecommendationConfig,

    /// Interaction history
    interactions: Arc<dyn InteractionStore>,

    /// Candidate apps
    catalog: Arc<dyn CatalogProvider>,

    /// Trending categories
    trending: Arc<dyn TrendingSource>,

    /// Optional per-user cache of ranked lists
    cache: Option<Arc<dyn RecommendationCache>>,

    /// Per-user count of cache-invalidating writes. A ranked list is only
    /// cached if no write landed since its history was read.
    generations: RwLock<HashMap<String, u64>>,

    /// Statistics tracking
    stats: Arc<RwLock<RecommendationStats>>,
}

impl RecommendationEngine {
    /// Create new recommendation engine
    pub fn new(
        config: RecommendationConfig,
        interactions: Arc<dyn InteractionStore>,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Self {
        info!(
            "🔧 Initializing Recommendation Engine (algorithm: {}, timeout: {:?})",
            config.algorithm,
            config.store_timeout()
        );
        Self {
            config,
            interactions,
            catalog,
            trending: Arc::new(StaticTrendingSource::default()),
            cache: None,
            generations: RwLock::new(HashMap::new()),
            stats: Arc::new(RwLock::new(RecommendationStats::default())),
        }
    }

    /// Replace the trending categories source
    pub fn with_trending_source(mut self, trending: Arc<dyn TrendingSource>) -> Self {
        self.trending = trending;
        self
    }

    /// Attach a per-user cache for personalized lists
    pub fn with_cache(mut self, cache: Arc<dyn RecommendationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Ranked recommendations for `user_id`, never empty for `limit >= 1`
    pub async fn get_personalized_recommendations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Vec<AppRecord> {
        self.recommend(user_id, limit).await.recommendations
    }

    /// Ranked recommendations together with where they came from
    #[instrument(level = "debug", skip(self))]
    pub async fn recommend(&self, user_id: &str, limit: usize) -> RecommendationOutcome {
        let start = Instant::now();
        let limit = self.clamp_limit(limit);

        let (recommendations, source, fallback_reason) = match self.personalize(user_id).await {
            Ok((ranked, source)) => (truncated(ranked, limit), source, None),
            Err(reason) => {
                info!(
                    user_id = %user_id,
                    reason = reason.as_str(),
                    served = "fallback",
                    "🔄 Serving fallback recommendations"
                );
                (self.fallback_recommendations(limit), RecommendationSource::Fallback, Some(reason))
            }
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        self.record_outcome(source, fallback_reason, processing_time_ms).await;

        debug!(
            user_id = %user_id,
            served = source.as_str(),
            count = recommendations.len(),
            "✅ Recommendations generated in {:?}",
            start.elapsed()
        );

        RecommendationOutcome {
            recommendations,
            source,
            fallback_reason,
            processing_time_ms,
        }
    }

    /// Fixed popular-apps list, score descending, truncated to `limit`
    pub fn fallback_recommendations(&self, limit: usize) -> Vec<AppRecord> {
        let mut apps = fallback_catalog();
        apps.sort_by(compare_apps);
        truncated(apps, limit)
    }

    /// Log one user action. Validation failures are returned; storage
    /// failures are logged and swallowed.
    #[instrument(level = "debug", skip(self, metadata))]
    pub async fn record_interaction(
        &self,
        user_id: &str,
        app_id: &str,
        interaction_type: &str,
        metadata: Option<InteractionMetadata>,
    ) -> Result<()> {
        let record = build_interaction(user_id, app_id, interaction_type, metadata.unwrap_or_default())?;

        match self.bounded("interaction append", self.interactions.append(record)).await {
            Ok(()) => {
                self.stats.write().await.interactions_recorded += 1;
                debug!("📝 Recorded {} of {} for {}", interaction_type, app_id, user_id);
            }
            Err(e) => {
                self.stats.write().await.interactions_dropped += 1;
                warn!(
                    user_id = %user_id,
                    app_id = %app_id,
                    error = %e,
                    "⚠️ Failed to record interaction"
                );
            }
        }

        if let Some(cache) = &self.cache {
            let mut generations = self.generations.write().await;
            *generations.entry(user_id.to_string()).or_insert(0) += 1;
            cache.invalidate(user_id).await;
        }
        Ok(())
    }

    /// Trending categories by score descending; degrades to the static seed
    #[instrument(level = "debug", skip(self))]
    pub async fn get_trending_categories(&self) -> TrendingCategories {
        let mut categories = match self
            .bounded("trending categories", self.trending.trending_categories())
            .await
        {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => default_trending_categories(),
            Err(e) => {
                warn!(error = %e, "⚠️ Trending source failed, using static categories");
                default_trending_categories()
            }
        };
        sort_trends(&mut categories);

        TrendingCategories {
            categories,
            last_updated: Utc::now(),
        }
    }

    pub async fn statistics(&self) -> RecommendationStats {
        self.stats.read().await.clone()
    }

    async fn personalize(
        &self,
        user_id: &str,
    ) -> std::result::Result<(Vec<AppRecord>, RecommendationSource), FallbackReason> {
        if user_id.trim().is_empty() {
            return Err(FallbackReason::InvalidUser);
        }

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(user_id).await {
                debug!("📋 Returning cached recommendations");
                return Ok((cached, RecommendationSource::Cached));
            }
        }

        let generation = self.generation(user_id).await;
        let history = self
            .bounded("interaction history", self.interactions.history(user_id))
            .await
            .map_err(|e| {
                warn!(user_id = %user_id, error = %e, "⚠️ Interaction store unavailable");
                FallbackReason::StoreUnavailable
            })?;
        if history.is_empty() {
            return Err(FallbackReason::NoHistory);
        }

        let preferences = derive_category_preferences(&history);
        let categories = top_categories(&preferences, self.config.top_categories);
        if categories.is_empty() {
            return Err(FallbackReason::NoCategories);
        }
        debug!(user_id = %user_id, ?categories, "🎯 Preferred categories");

        let candidates = self
            .bounded(
                "catalog query",
                self.catalog.apps_in_categories(&categories, user_id),
            )
            .await
            .map_err(|e| {
                warn!(user_id = %user_id, error = %e, "⚠️ Catalog provider unavailable");
                FallbackReason::StoreUnavailable
            })?;

        let ranked = rank_candidates(candidates, user_id, self.config.max_limit.max(1));
        if ranked.is_empty() {
            return Err(FallbackReason::NoCandidates);
        }

        if let Some(cache) = &self.cache {
            // Held across the put so a concurrent write cannot bump and
            // invalidate in between
            let generations = self.generations.read().await;
            if generations.get(user_id).copied().unwrap_or(0) == generation {
                cache.put(user_id, ranked.clone()).await;
            } else {
                debug!(user_id = %user_id, "📋 History changed while ranking, not caching");
            }
        }
        Ok((ranked, RecommendationSource::Personalized))
    }

    async fn generation(&self, user_id: &str) -> u64 {
        self.generations.read().await.get(user_id).copied().unwrap_or(0)
    }

    /// Run a collaborator call under the configured timeout
    async fn bounded<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.config.store_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AvmoError::Timeout(format!("{} exceeded {:?}", what, timeout))),
        }
    }

    fn clamp_limit(&self, limit: usize) -> usize {
        limit.clamp(1, self.config.max_limit.max(1))
    }

    async fn record_outcome(
        &self,
        source: RecommendationSource,
        fallback_reason: Option<FallbackReason>,
        processing_time_ms: u64,
    ) {
        let mut stats = self.stats.write().await;
        stats.total_requests += 1;
        match source {
            RecommendationSource::Personalized => stats.personalized_served += 1,
            RecommendationSource::Cached => stats.cached_served += 1,
            RecommendationSource::Fallback => stats.fallback_served += 1,
        }
        if let Some(reason) = fallback_reason {
            *stats
                .fallback_reasons
                .entry(reason.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats.average_processing_time_ms = (stats.average_processing_time_ms
            * (stats.total_requests - 1) as f64
            + processing_time_ms as f64)
            / stats.total_requests as f64;
    }
}

fn truncated(mut apps: Vec<AppRecord>, limit: usize) -> Vec<AppRecord> {
    apps.truncate(limit);
    apps
}

fn sort_trends(categories: &mut [CategoryTrend]) {
    categories.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}

/// Validate input and build the record to append
fn build_interaction(
    user_id: &str,
    app_id: &str,
    interaction_type: &str,
    metadata: InteractionMetadata,
) -> Result<InteractionRecord> {
    if user_id.trim().is_empty() {
        return Err(AvmoError::Validation("userId is required".to_string()));
    }
    if app_id.trim().is_empty() {
        return Err(AvmoError::Validation("appId is required".to_string()));
    }
    let interaction_type: InteractionType = interaction_type.parse()?;

    let category = match metadata.get(METADATA_CATEGORY) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(category)) => category.clone(),
        Some(other) => {
            return Err(AvmoError::Validation(format!(
                "metadata.category must be a string, got {}",
                other
            )))
        }
    };

    let usage_time = match metadata.get(METADATA_USAGE_TIME) {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(value) => match value.as_f64() {
            Some(usage) if usage.is_finite() && usage >= 0.0 => usage,
            _ => {
                return Err(AvmoError::Validation(format!(
                    "metadata.usageTime must be a non-negative number, got {}",
                    value
                )))
            }
        },
    };

    Ok(InteractionRecord {
        user_id: user_id.to_string(),
        app_id: app_id.to_string(),
        interaction_type,
        category,
        usage_time,
        metadata,
        timestamp: Utc::now(),
    })
}
