//! AVMo API Library
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//!
//! HTTP surface of the AVMo AI service: recommendations, interaction
//! tracking, trending categories, VM optimization analysis and usage
//! analytics.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

/// Header carrying the authenticated user id, set by the auth gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Response header naming where a recommendation list came from
pub const RECOMMENDATION_SOURCE_HEADER: &str = "x-recommendation-source";

/// User id used when no authenticated user is present
pub const ANONYMOUS_USER: &str = "anonymous";

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Name reported by the health endpoint
    pub service_name: String,

    /// Origins allowed by CORS; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "AI Service".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.service_name, "AI Service");
        assert!(config.allowed_origins.is_empty());
    }
}
