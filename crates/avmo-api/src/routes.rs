//! API routes for the AVMo AI service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::apply_middleware, state::AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        .route(
            "/recommendations/interaction",
            post(handlers::record_interaction),
        )
        .route(
            "/recommendations/categories",
            get(handlers::trending_categories),
        )
        .route("/recommendations/stats", get(handlers::recommendation_stats))
        // VM optimization
        .route("/optimization/analyze", get(handlers::analyze_optimization))
        .route("/optimization/apply", post(handlers::apply_optimization))
        .route("/optimization/history", get(handlers::optimization_history))
        .route("/optimization/predictive", get(handlers::predictive_scaling))
        .route("/optimization/cost", get(handlers::cost_analysis))
        // Usage analytics
        .route("/analytics/track", post(handlers::track_feature))
        .route("/analytics/features", get(handlers::feature_usage))
        .route("/analytics/performance", get(handlers::performance_metrics))
        .route("/analytics/dashboard", get(handlers::analytics_dashboard))
        .route("/analytics/insights", get(handlers::analytics_insights))
        .fallback(handlers::not_found)
        .with_state(state);

    apply_middleware(router, &config)
}
