//! Static catalogs: the popular-apps fallback list and the trending seed.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use avmo_common::Result;

use crate::models::{AppRecord, CategoryTrend, TrendDirection};
use crate::store::TrendingSource;

#[allow(clippy::too_many_arguments)]
fn popular_app(
    id: &str,
    name: &str,
    category: &str,
    description: &str,
    icon_name: &str,
    version: &str,
    size: &str,
    score: f64,
    popularity: u32,
    reason: &str,
) -> AppRecord {
    AppRecord {
        icon_name: Some(icon_name.to_string()),
        version: Some(version.to_string()),
        size: Some(size.to_string()),
        ai_recommendation_reason: Some(reason.to_string()),
        ..AppRecord::new(id, name, category, score, popularity).with_description(description)
    }
}

/// Hand-curated popular apps served whenever personalization is unavailable.
///
/// Ordered by score descending; every entry has a distinct category.
pub fn fallback_catalog() -> Vec<AppRecord> {
    vec![
        popular_app(
            "app_3",
            "Development IDE",
            "Developer Tools",
            "Full-featured integrated development environment",
            "chevron.left.forwardslash.chevron.right",
            "3.0.1",
            "128MB",
            4.9,
            82,
            "Essential for developers",
        ),
        popular_app(
            "app_1",
            "Virtual Office Suite",
            "Productivity",
            "Complete office productivity suite for virtual environments",
            "doc.text",
            "2.1.0",
            "45MB",
            4.8,
            95,
            "Highly popular among productivity users",
        ),
        popular_app(
            "app_5",
            "Team Collaboration",
            "Communication",
            "Real-time team communication and collaboration platform",
            "person.2",
            "1.8.0",
            "41MB",
            4.7,
            84,
            "Ideal for team productivity",
        ),
        popular_app(
            "app_2",
            "Secure Browser",
            "Internet",
            "Privacy-focused web browser with advanced security features",
            "safari",
            "1.5.0",
            "32MB",
            4.6,
            88,
            "Perfect for secure browsing",
        ),
        popular_app(
            "app_4",
            "Media Player Pro",
            "Entertainment",
            "Advanced media player supporting all formats",
            "play.circle",
            "2.3.0",
            "28MB",
            4.4,
            76,
            "Great for multimedia content",
        ),
    ]
}

/// Default trending categories, score descending
pub fn default_trending_categories() -> Vec<CategoryTrend> {
    vec![
        CategoryTrend::new("Productivity", TrendDirection::Up, 92),
        CategoryTrend::new("Developer Tools", TrendDirection::Up, 88),
        CategoryTrend::new("Communication", TrendDirection::Stable, 84),
        CategoryTrend::new("Internet", TrendDirection::Up, 82),
        CategoryTrend::new("Entertainment", TrendDirection::Down, 76),
    ]
}

/// Trending source backed by a fixed table
#[derive(Debug, Clone)]
pub struct StaticTrendingSource {
    categories: Vec<CategoryTrend>,
}

impl StaticTrendingSource {
    pub fn new(categories: Vec<CategoryTrend>) -> Self {
        Self { categories }
    }
}

impl Default for StaticTrendingSource {
    fn default() -> Self {
        Self::new(default_trending_categories())
    }
}

#[async_trait]
impl TrendingSource for StaticTrendingSource {
    async fn trending_categories(&self) -> Result<Vec<CategoryTrend>> {
        Ok(self.categories.clone())
    }
}

/// Load catalog entries from a JSON array file
pub async fn load_apps_from_file(path: impl AsRef<Path>) -> Result<Vec<AppRecord>> {
    let path = path.as_ref();
    debug!("📚 Loading catalog seed from {}", path.display());
    let raw = tokio::fs::read_to_string(path).await?;
    let apps: Vec<AppRecord> = serde_json::from_str(&raw)?;
    info!("✅ Loaded {} catalog entries from {}", apps.len(), path.display());
    Ok(apps)
}
