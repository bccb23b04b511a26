//! AVMo Recommendation - Data Model
//!
//! Catalog entries, logged interactions and the derived views the engine
//! computes from them. JSON field names follow the camelCase wire format
//! used by the mobile client.
//!
//! Author: AVMo Development Team
//! Version: 0.1.0
//! License: MIT

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use avmo_common::AvmoError;

/// Open key-value metadata attached to an interaction
pub type InteractionMetadata = serde_json::Map<String, serde_json::Value>;

/// A catalog entry eligible for recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Quality signal, 0.0 - 5.0
    pub score: f64,
    /// Popularity signal, 0 - 100
    pub popularity: u32,
    /// User that published or installed this entry, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_recommendation_reason: Option<String>,
}

impl AppRecord {
    /// Minimal record, mostly useful for catalog seeding and tests
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        score: f64,
        popularity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: String::new(),
            score,
            popularity,
            owner_id: None,
            icon_name: None,
            version: None,
            size: None,
            ai_recommendation_reason: None,
        }
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Kind of user action on an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Install,
    Launch,
    Uninstall,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Install => "install",
            InteractionType::Launch => "launch",
            InteractionType::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = AvmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(InteractionType::View),
            "install" => Ok(InteractionType::Install),
            "launch" => Ok(InteractionType::Launch),
            "uninstall" => Ok(InteractionType::Uninstall),
            other => Err(AvmoError::Validation(format!(
                "unknown interaction type '{}', expected one of view, install, launch, uninstall",
                other
            ))),
        }
    }
}

/// One observed user action on an app. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub user_id: String,
    pub app_id: String,
    pub interaction_type: InteractionType,
    /// Denormalized from the app at interaction time; empty when unknown
    #[serde(default)]
    pub category: String,
    /// Accumulated duration signal, non-negative
    #[serde(default)]
    pub usage_time: f64,
    #[serde(default)]
    pub metadata: InteractionMetadata,
    pub timestamp: DateTime<Utc>,
}

/// Per-user category weight derived from interaction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPreference {
    pub category: String,
    pub weight: f64,
}

/// Direction of a category trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// A ranked category label with its trend indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub name: String,
    pub trend: TrendDirection,
    /// 0 - 100
    pub score: u32,
}

impl CategoryTrend {
    pub fn new(name: impl Into<String>, trend: TrendDirection, score: u32) -> Self {
        Self {
            name: name.into(),
            trend,
            score,
        }
    }
}

/// Trending categories response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingCategories {
    pub categories: Vec<CategoryTrend>,
    pub last_updated: DateTime<Utc>,
}

/// Where a recommendation list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Personalized,
    Cached,
    Fallback,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Personalized => "personalized",
            RecommendationSource::Cached => "cached",
            RecommendationSource::Fallback => "fallback",
        }
    }
}

/// Why the static popular-apps list was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    InvalidUser,
    StoreUnavailable,
    NoHistory,
    NoCategories,
    NoCandidates,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::InvalidUser => "invalid_user",
            FallbackReason::StoreUnavailable => "store_unavailable",
            FallbackReason::NoHistory => "no_history",
            FallbackReason::NoCategories => "no_categories",
            FallbackReason::NoCandidates => "no_candidates",
        }
    }
}

/// Recommendation list together with serving diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<AppRecord>,
    pub source: RecommendationSource,
    pub fallback_reason: Option<FallbackReason>,
    pub processing_time_ms: u64,
}

impl RecommendationOutcome {
    pub fn is_fallback(&self) -> bool {
        self.source == RecommendationSource::Fallback
    }
}

/// Recommendation statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationStats {
    pub total_requests: u64,
    pub personalized_served: u64,
    pub cached_served: u64,
    pub fallback_served: u64,
    pub fallback_reasons: HashMap<String, u64>,
    pub interactions_recorded: u64,
    pub interactions_dropped: u64,
    pub average_processing_time_ms: f64,
}
