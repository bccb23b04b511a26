use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot` method

use avmo_api::{create_router, ApiConfig, AppState};
use avmo_recommendation::{
    analytics::MemoryFeatureUsageStore,
    optimization::{
        metrics::{CpuUsage, MemoryUsage, NetworkUsage, StorageUsage},
        FixedMetricsSource, MemoryOptimizationHistory, ResourceSnapshot,
    },
    store::{MemoryCatalog, MemoryInteractionStore},
    AnalyticsService, OptimizationAnalyzer, OptimizationConfig, RecommendationConfig,
    RecommendationEngine,
};

fn snapshot() -> ResourceSnapshot {
    ResourceSnapshot {
        cpu: CpuUsage {
            allocated_cores: 4,
            usage: 92.0,
            efficiency: 60.0,
        },
        memory: MemoryUsage {
            allocated_mb: 8192,
            usage: 40.0,
            efficiency: 60.0,
        },
        storage: StorageUsage {
            allocated_mb: 256_000,
            usage: 40.0,
            efficiency: 60.0,
        },
        network: NetworkUsage {
            bandwidth_mbps: 1000,
            usage: 20.0,
            latency_ms: 12.0,
        },
    }
}

fn test_router() -> Router {
    let engine = RecommendationEngine::new(
        RecommendationConfig::default(),
        Arc::new(MemoryInteractionStore::new()),
        Arc::new(MemoryCatalog::seeded()),
    );
    let metrics = Arc::new(FixedMetricsSource {
        snapshot: snapshot(),
        forecast_cpu: 95.0,
        forecast_memory: 30.0,
    });
    let history = Arc::new(MemoryOptimizationHistory::new());
    let optimizer = OptimizationAnalyzer::new(
        OptimizationConfig::default(),
        metrics.clone(),
        history.clone(),
    );
    let analytics = AnalyticsService::new(
        Arc::new(MemoryFeatureUsageStore::new()),
        metrics,
        history,
    );

    create_router(AppState::new(
        ApiConfig::default(),
        Arc::new(engine),
        Arc::new(optimizer),
        Arc::new(analytics),
    ))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let source = response
        .headers()
        .get("x-recommendation-source")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body, source)
}

fn get(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|app| app["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/health", "anyone")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "AI Service");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_new_user_gets_popular_apps() {
    let router = test_router();
    let (status, body, source) =
        send(&router, get("/recommendations?limit=3", "new_user")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ids(&body), vec!["app_3", "app_1", "app_5"]);
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["userId"], "new_user");
    assert_eq!(body["data"]["algorithm"], "collaborative_filtering_v1");
    assert_eq!(source.as_deref(), Some("fallback"));
}

#[tokio::test]
async fn test_anonymous_and_bad_limit_use_defaults() {
    let router = test_router();
    let request = Request::builder()
        .uri("/recommendations?limit=lots")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "anonymous");
    // Five popular apps exist; the default limit of 10 returns all of them
    assert_eq!(body["data"]["count"], 5);
}

#[tokio::test]
async fn test_interaction_personalizes_recommendations() {
    let router = test_router();

    let (status, body, _) = send(
        &router,
        post(
            "/recommendations/interaction",
            "dev",
            json!({
                "appId": "app_1",
                "interactionType": "launch",
                "metadata": {"category": "Developer Tools", "usageTime": 42}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Interaction recorded successfully");

    let (status, body, source) = send(&router, get("/recommendations?limit=5", "dev")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.as_deref(), Some("personalized"));
    for app in body["data"]["recommendations"].as_array().unwrap() {
        assert_eq!(app["category"], "Developer Tools");
    }
}

#[tokio::test]
async fn test_interaction_requires_fields() {
    let router = test_router();

    let (status, body, _) = send(
        &router,
        post(
            "/recommendations/interaction",
            "u",
            json!({"interactionType": "view"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "appId and interactionType are required");

    let (status, _, _) = send(
        &router,
        post(
            "/recommendations/interaction",
            "u",
            json!({"appId": "app_1", "interactionType": "teleport"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = test_router();
    let request = Request::builder()
        .method("POST")
        .uri("/recommendations/interaction")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_trending_categories() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/recommendations/categories", "u")).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["data"]["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[0]["name"], "Productivity");
    assert_eq!(categories[0]["score"], 92);
    assert!(body["data"]["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_stats_count_fallbacks() {
    let router = test_router();
    send(&router, get("/recommendations", "a")).await;
    send(&router, get("/recommendations", "b")).await;

    let (status, body, _) = send(&router, get("/recommendations/stats", "a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRequests"], 2);
    assert_eq!(body["data"]["fallbackServed"], 2);
    assert_eq!(body["data"]["fallbackReasons"]["no_history"], 2);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/does/not/exist", "u")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "AI Service endpoint not found");
}

#[tokio::test]
async fn test_optimization_analyze() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/optimization/analyze", "u")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["synthetic"], true);
    let optimizations = body["data"]["optimizations"].as_array().unwrap();
    assert_eq!(optimizations.len(), 1);
    assert_eq!(optimizations[0]["type"], "cpu");
    assert_eq!(optimizations[0]["recommendedValue"], 6);
    // (8 + 60 + 60 + 76) / 4
    assert_eq!(body["data"]["score"], 51);
}

#[tokio::test]
async fn test_optimization_apply_and_history() {
    let router = test_router();

    let (status, _, _) = send(&router, post("/optimization/apply", "u", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(
        &router,
        post(
            "/optimization/apply",
            "u",
            json!({"type": "cpu", "parameters": {"cores": 6}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");
    assert_eq!(body["data"]["type"], "cpu");

    let (status, body, _) = send(&router, get("/optimization/history?limit=5", "u")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["history"][0]["parameters"]["cores"], 6);

    let (_, body, _) = send(&router, get("/optimization/history", "someone_else")).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_predictive_scaling() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/optimization/predictive", "u")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nextHour"]["confidence"], 0.85);
    let recommendations = body["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["resource"], "cpu");
}

#[tokio::test]
async fn test_cost_analysis() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/optimization/cost", "u")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["current"]["monthly"], 89.99);
    assert_eq!(body["data"]["optimized"]["savings"], 22.5);
    assert_eq!(body["data"]["recommendations"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["synthetic"], true);
}

#[tokio::test]
async fn test_track_requires_feature() {
    let router = test_router();

    for payload in [json!({}), json!({"feature": "  "}), json!({"metadata": {"a": 1}})] {
        let (status, body, _) = send(&router, post("/analytics/track", "u", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Feature name is required");
    }

    let (_, body, _) = send(&router, get("/analytics/features", "u")).await;
    assert_eq!(body["data"]["usage"]["totalInteractions"], 0);
}

#[tokio::test]
async fn test_feature_usage_counts_tracked_events() {
    let router = test_router();
    for (user, feature) in [
        ("a", "recommendations"),
        ("a", "optimization"),
        ("b", "recommendations"),
    ] {
        let (status, body, _) = send(
            &router,
            post("/analytics/track", user, json!({"feature": feature, "metadata": {"screen": "home"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Feature usage tracked successfully");
    }

    let (status, body, _) = send(&router, get("/analytics/features", "a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timeRange"], "7d");
    let usage = &body["data"]["usage"];
    assert_eq!(usage["totalInteractions"], 3);
    assert_eq!(usage["uniqueUsers"], 2);
    assert_eq!(usage["featuresUsed"]["recommendations"], 2);
    assert_eq!(usage["topFeatures"][0]["feature"], "recommendations");

    let (status, body, _) = send(&router, get("/analytics/features?timeRange=1h", "a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timeRange"], "1h");
    assert_eq!(body["data"]["usage"]["totalInteractions"], 3);

    let (status, body, _) = send(&router, get("/analytics/features?timeRange=forever", "a")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_performance_metrics() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/analytics/performance", "u")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["synthetic"], true);
    assert_eq!(data["current"]["cpu_usage"], 92.0);
    assert_eq!(data["current"]["disk_usage"], 40.0);
    assert_eq!(data["status"], "degraded");
    assert_eq!(data["recommendations"][0]["type"], "memory");
    assert_eq!(data["recommendations"][0]["priority"], "low");
    assert_eq!(data["recommendations"][1]["priority"], "high");
}

#[tokio::test]
async fn test_dashboard() {
    let router = test_router();
    send(&router, post("/analytics/track", "u", json!({"feature": "optimization"}))).await;
    send(&router, post("/optimization/apply", "u", json!({"type": "cpu"}))).await;

    let (status, body, _) = send(&router, get("/analytics/dashboard", "u")).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["timeRange"], "24h");
    assert_eq!(data["synthetic"], true);
    assert_eq!(data["overview"]["featureInteractions"], 1);
    assert_eq!(data["overview"]["optimizationsApplied"], 1);
    assert_eq!(data["overview"]["vmEfficiencyScore"], 51);
    assert!(data["overview"]["lastOptimized"].is_string());
    assert_eq!(data["insights"][0]["title"], "Increase CPU Allocation");
    assert_eq!(data["alerts"][0]["id"], "cpu_high");

    let (_, body, _) = send(&router, get("/analytics/dashboard?timeRange=7d", "nobody")).await;
    assert_eq!(body["data"]["overview"]["featureInteractions"], 0);
    assert!(body["data"]["overview"]["lastOptimized"].is_null());
}

#[tokio::test]
async fn test_insights() {
    let router = test_router();
    let (status, body, _) = send(&router, get("/analytics/insights", "u")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["insights"][0]["type"], "performance");
    assert!(body["data"]["lastAnalyzed"].is_string());
}
