//! Wiring of stores, engine, analyzer and analytics from a [`Config`].

use std::{sync::Arc, time::Instant};

use tracing::{info, instrument};

use avmo_api::AppState;
use avmo_common::{AvmoError, Result};
use avmo_recommendation::{
    analytics::{FeatureUsageStore, MemoryFeatureUsageStore},
    catalog::load_apps_from_file,
    optimization::{MemoryOptimizationHistory, RandomMetricsSource},
    store::{
        CatalogProvider, InteractionStore, MemoryCatalog, MemoryInteractionStore,
        MemoryRecommendationCache,
    },
    AnalyticsService, OptimizationAnalyzer, RecommendationEngine,
};

use crate::{Backend, Config};

/// Everything the server needs at runtime
pub struct Services {
    pub state: AppState,
    pub interactions: Arc<dyn InteractionStore>,
    pub feature_usage: Arc<dyn FeatureUsageStore>,
}

/// Build stores for the configured backend, then the engine, analyzer and analytics
#[instrument(level = "info", skip_all, fields(backend = ?config.backend))]
pub async fn build_services(config: &Config) -> Result<Services> {
    let start = Instant::now();

    let (interactions, catalog) = match config.backend {
        Backend::Memory => memory_stores(config).await?,
        Backend::Postgresql => postgres_stores(config).await?,
    };

    let mut engine = RecommendationEngine::new(
        config.recommendation.clone(),
        interactions.clone(),
        catalog,
    );
    if config.recommendation.cache_enabled() {
        info!(
            "📋 Recommendation cache enabled (ttl {:?}, {} entries)",
            config.recommendation.cache_ttl(),
            config.recommendation.cache_size
        );
        engine = engine.with_cache(Arc::new(MemoryRecommendationCache::new(
            config.recommendation.cache_ttl(),
            config.recommendation.cache_size,
        )));
    }

    // Optimization history and feature usage stay in memory on every backend
    let metrics = Arc::new(RandomMetricsSource::new(config.optimization.clone()));
    let history = Arc::new(MemoryOptimizationHistory::new());
    let feature_usage: Arc<dyn FeatureUsageStore> = Arc::new(MemoryFeatureUsageStore::new());

    let optimizer = OptimizationAnalyzer::new(
        config.optimization.clone(),
        metrics.clone(),
        history.clone(),
    );
    let analytics = AnalyticsService::new(feature_usage.clone(), metrics, history);

    info!("✅ Services ready in {:?}", start.elapsed());
    Ok(Services {
        state: AppState::new(
            config.api_config(),
            Arc::new(engine),
            Arc::new(optimizer),
            Arc::new(analytics),
        ),
        interactions,
        feature_usage,
    })
}

async fn memory_stores(
    config: &Config,
) -> Result<(Arc<dyn InteractionStore>, Arc<dyn CatalogProvider>)> {
    let catalog = MemoryCatalog::seeded();
    if let Some(path) = &config.catalog_seed_path {
        for app in load_apps_from_file(path).await? {
            catalog.insert(app).await;
        }
    }
    info!("💾 In-memory catalog with {} apps", catalog.len().await);
    Ok((Arc::new(MemoryInteractionStore::new()), Arc::new(catalog)))
}

#[cfg(feature = "backend_postgresql")]
async fn postgres_stores(
    config: &Config,
) -> Result<(Arc<dyn InteractionStore>, Arc<dyn CatalogProvider>)> {
    use avmo_recommendation::{catalog::fallback_catalog, store::PostgresStore};

    let url = config.database_url.as_deref().ok_or_else(|| {
        AvmoError::Config("database_url is required for the postgresql backend".to_string())
    })?;
    let store = PostgresStore::connect(url, config.db_pool_max_connections).await?;
    store.migrate().await?;

    let mut seed = fallback_catalog();
    if let Some(path) = &config.catalog_seed_path {
        seed.extend(load_apps_from_file(path).await?);
    }
    for app in &seed {
        store.upsert_app(app).await?;
    }
    info!("🗄️ PostgreSQL catalog seeded with {} apps", seed.len());

    let store = Arc::new(store);
    Ok((store.clone(), store))
}

#[cfg(not(feature = "backend_postgresql"))]
async fn postgres_stores(
    _config: &Config,
) -> Result<(Arc<dyn InteractionStore>, Arc<dyn CatalogProvider>)> {
    Err(AvmoError::Config(
        "postgresql backend requested but the binary was built without backend_postgresql"
            .to_string(),
    ))
}
