//! AVMo Recommendation
//!
//! App recommendations, interaction tracking, trending categories, VM
//! optimization analysis and feature usage analytics for the ShaydZ AVMo
//! platform.
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//! License: MIT

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod models;
pub mod optimization;
pub mod recommendation;
pub mod store;

pub use avmo_common::{AvmoError, Result};
pub use analytics::AnalyticsService;
pub use config::{OptimizationConfig, RecommendationConfig};
pub use optimization::OptimizationAnalyzer;
pub use recommendation::RecommendationEngine;

