//! Request handlers for the AVMo API
//!
//! Successful responses use the `{ "success": true, "data": ... }` envelope;
//! failures go through [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use avmo_recommendation::{
    analytics::{TimeRange, DEFAULT_DASHBOARD_RANGE, DEFAULT_FEATURES_RANGE},
    models::{AppRecord, InteractionMetadata},
};

use crate::{error::ApiError, state::AppState, ANONYMOUS_USER, RECOMMENDATION_SOURCE_HEADER, USER_ID_HEADER};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub recommendations: Vec<AppRecord>,
    pub user_id: String,
    pub count: usize,
    pub algorithm: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub history: Vec<T>,
    pub count: usize,
}

/// `?limit=` as sent by the client; parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub app_id: Option<String>,
    pub interaction_type: Option<String>,
    pub metadata: Option<InteractionMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyOptimizationRequest {
    #[serde(rename = "type")]
    pub optimization_type: Option<String>,
    pub parameters: Option<Value>,
}

/// `?timeRange=` such as `24h` or `7d`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeQuery {
    pub time_range: Option<String>,
}

impl TimeRangeQuery {
    /// Parse the window, using `default` when absent or blank
    pub fn parse_or(&self, default: &str) -> Result<TimeRange, ApiError> {
        let raw = self
            .time_range
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(default);
        Ok(raw.parse::<TimeRange>()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackFeatureRequest {
    pub feature: Option<String>,
    pub metadata: Option<InteractionMetadata>,
}

/// Requesting user from the auth gateway header
pub fn request_user(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_USER)
        .to_string()
}

/// Parse a `limit` query value. Missing, unparsable or zero yields `None`;
/// negative values become 1.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<i64>().ok()?;
    if value == 0 {
        return None;
    }
    Some(value.max(1) as usize)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "UP".to_string(),
        service: state.config.service_name.clone(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// GET /recommendations
#[instrument(level = "debug", skip_all)]
pub async fn get_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LimitQuery>,
) -> Response {
    let user_id = request_user(&headers);
    let limit = parse_limit(query.limit.as_deref()).unwrap_or(state.engine.config().default_limit);

    let outcome = state.engine.recommend(&user_id, limit).await;
    let source = outcome.source;
    debug!(user_id = %user_id, served = source.as_str(), "📤 Sending recommendations");

    let body = RecommendationsResponse {
        count: outcome.recommendations.len(),
        recommendations: outcome.recommendations,
        user_id,
        algorithm: state.engine.config().algorithm.clone(),
    };

    let mut response = ApiResponse::ok(body).into_response();
    response.headers_mut().insert(
        RECOMMENDATION_SOURCE_HEADER,
        HeaderValue::from_static(source.as_str()),
    );
    response
}

/// POST /recommendations/interaction
#[instrument(level = "debug", skip_all)]
pub async fn record_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<InteractionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let user_id = request_user(&headers);
    let request = json_body(payload)?;

    let (Some(app_id), Some(interaction_type)) = (
        required(request.app_id),
        required(request.interaction_type),
    ) else {
        return Err(ApiError::BadRequest(
            "appId and interactionType are required".to_string(),
        ));
    };

    state
        .engine
        .record_interaction(&user_id, &app_id, &interaction_type, request.metadata)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Interaction recorded successfully"
    })))
}

/// GET /recommendations/categories
pub async fn trending_categories(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.get_trending_categories().await)
}

/// GET /recommendations/stats
pub async fn recommendation_stats(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(state.engine.statistics().await)
}

/// GET /optimization/analyze
#[instrument(level = "debug", skip_all)]
pub async fn analyze_optimization(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    let analysis = state.optimizer.analyze(&user_id).await?;
    Ok(ApiResponse::ok(analysis))
}

/// POST /optimization/apply
#[instrument(level = "debug", skip_all)]
pub async fn apply_optimization(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ApplyOptimizationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    let request = json_body(payload)?;

    let Some(optimization_type) = required(request.optimization_type) else {
        return Err(ApiError::BadRequest(
            "Optimization type is required".to_string(),
        ));
    };

    let record = state
        .optimizer
        .apply(&user_id, &optimization_type, request.parameters)
        .await?;
    Ok(ApiResponse::ok(record))
}

/// GET /optimization/history
pub async fn optimization_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    let history = state
        .optimizer
        .history(&user_id, parse_limit(query.limit.as_deref()))
        .await?;

    Ok(ApiResponse::ok(HistoryResponse {
        count: history.len(),
        history,
    }))
}

/// GET /optimization/predictive
pub async fn predictive_scaling(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    let predictions = state.optimizer.predictive_scaling(&user_id).await?;
    Ok(ApiResponse::ok(predictions))
}

/// GET /optimization/cost
pub async fn cost_analysis(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(ApiResponse::ok(state.optimizer.cost_analysis()?))
}

/// POST /analytics/track
#[instrument(level = "debug", skip_all)]
pub async fn track_feature(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TrackFeatureRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let user_id = request_user(&headers);
    let request = json_body(payload)?;

    let Some(feature) = required(request.feature) else {
        return Err(ApiError::BadRequest("Feature name is required".to_string()));
    };

    state
        .analytics
        .track(&user_id, &feature, request.metadata)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Feature usage tracked successfully"
    })))
}

/// GET /analytics/features
pub async fn feature_usage(
    State(state): State<AppState>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.parse_or(DEFAULT_FEATURES_RANGE)?;
    Ok(ApiResponse::ok(state.analytics.feature_usage(&range).await?))
}

/// GET /analytics/performance
pub async fn performance_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    Ok(ApiResponse::ok(state.analytics.performance(&user_id).await?))
}

/// GET /analytics/dashboard
pub async fn analytics_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TimeRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = request_user(&headers);
    let range = query.parse_or(DEFAULT_DASHBOARD_RANGE)?;
    Ok(ApiResponse::ok(state.analytics.dashboard(&user_id, &range).await?))
}

/// GET /analytics/insights
pub async fn analytics_insights(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(state.analytics.insights())
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("🔍 No route for {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "AI Service endpoint not found"
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), None);
        assert_eq!(parse_limit(Some("5")), Some(5));
        assert_eq!(parse_limit(Some(" 7 ")), Some(7));
        assert_eq!(parse_limit(Some("abc")), None);
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-3")), Some(1));
    }

    #[test]
    fn test_time_range_query() {
        let query = TimeRangeQuery::default();
        assert_eq!(query.parse_or("7d").unwrap().hours(), 168);

        let query = TimeRangeQuery {
            time_range: Some(" ".to_string()),
        };
        assert_eq!(query.parse_or("24h").unwrap().hours(), 24);

        let query = TimeRangeQuery {
            time_range: Some("2w".to_string()),
        };
        assert_eq!(query.parse_or("24h").unwrap().to_string(), "2w");

        let query = TimeRangeQuery {
            time_range: Some("forever".to_string()),
        };
        assert_eq!(
            query.parse_or("24h").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_request_user() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_user(&headers), "anonymous");

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(request_user(&headers), "anonymous");

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user_42"));
        assert_eq!(request_user(&headers), "user_42");
    }
}
