//! Middleware components for the AVMo API
//!
//! Request tracing keyed by matched route, CORS and a JSON body for
//! method mismatches.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::{ApiConfig, USER_ID_HEADER};

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_owned();
    let method = request.method().clone();

    let response = next.run(request).await;

    debug!(
        method = %method,
        path = %path,
        status = %response.status(),
        latency = ?start.elapsed(),
        "Request completed"
    );

    response
}

/// Replace axum's empty 405 with a JSON error body
pub async fn unrecognized_method(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let inner = next.run(request).await;
    if inner.status() == StatusCode::METHOD_NOT_ALLOWED {
        warn!("Method not allowed: {method} {uri}");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({
                "success": false,
                "error": "Method Not Allowed"
            })),
        )
            .into_response();
    }
    inner
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(86400))
}

/// Wrap `router` in the common middleware stack
pub fn apply_middleware(router: Router, config: &ApiConfig) -> Router {
    let middlewares = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let path = if let Some(path) = request.extensions().get::<MatchedPath>() {
                    path.as_str()
                } else {
                    request.uri().path()
                };

                tracing::info_span!("http_request", method = %request.method(), %path)
            }),
        )
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(unrecognized_method))
        .layer(cors_layer(config));

    router.layer(middlewares)
}
