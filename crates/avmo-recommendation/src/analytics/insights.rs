//! Static platform insights served until a real analysis pipeline exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightAction {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub actionable: bool,
    pub actions: Vec<InsightAction>,
    pub impact: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub insights: Vec<Insight>,
    pub count: usize,
    pub last_analyzed: DateTime<Utc>,
}

fn action(label: &str, kind: &str, endpoint: &str) -> InsightAction {
    InsightAction {
        label: label.to_string(),
        kind: kind.to_string(),
        endpoint: endpoint.to_string(),
    }
}

pub fn default_insights() -> Vec<Insight> {
    vec![
        Insight {
            id: "insight_1".to_string(),
            kind: "performance".to_string(),
            title: "VM Resource Optimization".to_string(),
            description: "Your virtual machine shows potential for 15% performance improvement \
                          through optimized resource allocation."
                .to_string(),
            confidence: 0.87,
            actionable: true,
            actions: vec![action("Optimize Now", "optimization", "/optimization/analyze")],
            impact: "medium".to_string(),
            category: "performance".to_string(),
        },
        Insight {
            id: "insight_2".to_string(),
            kind: "usage".to_string(),
            title: "App Usage Pattern Analysis".to_string(),
            description: "You primarily use productivity apps during work hours. \
                          Consider exploring collaboration tools."
                .to_string(),
            confidence: 0.92,
            actionable: true,
            actions: vec![action("View Recommendations", "navigation", "/recommendations")],
            impact: "low".to_string(),
            category: "recommendations".to_string(),
        },
        Insight {
            id: "insight_3".to_string(),
            kind: "security".to_string(),
            title: "Security Best Practices".to_string(),
            description: "Your virtual environment follows security best practices with regular updates."
                .to_string(),
            confidence: 0.95,
            actionable: false,
            actions: Vec::new(),
            impact: "positive".to_string(),
            category: "security".to_string(),
        },
    ]
}
