//! Shared handler state.

use std::sync::Arc;

use avmo_recommendation::{AnalyticsService, OptimizationAnalyzer, RecommendationEngine};

use crate::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub engine: Arc<RecommendationEngine>,
    pub optimizer: Arc<OptimizationAnalyzer>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        engine: Arc<RecommendationEngine>,
        optimizer: Arc<OptimizationAnalyzer>,
        analytics: Arc<AnalyticsService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            optimizer,
            analytics,
        }
    }
}
