//! Cost breakdown for a VM allocation.
//!
//! Prices come from a fixed table; no billing system is consulted.

use serde::{Deserialize, Serialize};

/// Monthly price per resource, in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub cpu: f64,
    pub memory: f64,
    pub storage: f64,
    pub network: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.cpu + self.memory + self.storage + self.network
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentCost {
    pub monthly: f64,
    pub daily: f64,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedCost {
    pub monthly: f64,
    pub daily: f64,
    pub savings: f64,
    pub breakdown: CostBreakdown,
}

/// One way to lower the bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSaving {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub monthly_savings: f64,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub current: CurrentCost,
    pub optimized: OptimizedCost,
    pub recommendations: Vec<CostSaving>,
    /// Prices are list prices, not a user's actual bill
    pub synthetic: bool,
}

fn saving(kind: &str, description: &str, monthly_savings: f64, impact: &str) -> CostSaving {
    CostSaving {
        kind: kind.to_string(),
        description: description.to_string(),
        monthly_savings,
        impact: impact.to_string(),
    }
}

/// Static cost table for the default allocation
pub fn default_cost_analysis() -> CostAnalysis {
    CostAnalysis {
        current: CurrentCost {
            monthly: 89.99,
            daily: 2.97,
            breakdown: CostBreakdown {
                cpu: 45.00,
                memory: 25.99,
                storage: 15.00,
                network: 4.00,
            },
        },
        optimized: OptimizedCost {
            monthly: 67.49,
            daily: 2.23,
            savings: 22.50,
            breakdown: CostBreakdown {
                cpu: 32.00,
                memory: 20.99,
                storage: 12.00,
                network: 2.50,
            },
        },
        recommendations: vec![
            saving(
                "cpu_downsizing",
                "Reduce CPU allocation during off-peak hours",
                13.00,
                "minimal",
            ),
            saving(
                "storage_cleanup",
                "Archive unused data to cheaper storage tier",
                6.50,
                "none",
            ),
            saving(
                "network_optimization",
                "Optimize network usage patterns",
                3.00,
                "minimal",
            ),
        ],
        synthetic: true,
    }
}
