// =============================================================================
// AVMo AI Service - Library Crate
// =============================================================================
//
// Project: ShaydZ AVMo - Virtual Mobile Device Platform
// Contributors: AVMo Development Team
// Version: 0.1.0
// License: MIT
//
// Description:
//   Service configuration and bootstrap for the AVMo AI service. The
//   recommendation engine lives in `avmo-recommendation`, the HTTP layer in
//   `avmo-api`.
//
// =============================================================================

use std::{net::IpAddr, path::{Path, PathBuf}, time::Duration};

use chrono::TimeDelta;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod retention;
pub mod service;

// Re-export workspace crates
pub use avmo_api as api;
pub use avmo_common as common;
pub use avmo_recommendation as recommendation;

pub use avmo_common::{AvmoError, Result};
pub use avmo_recommendation::{OptimizationConfig, RecommendationConfig};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "AVMO_";

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "AVMO_CONFIG";

/// Longest accepted interaction retention, about a century
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Storage backend for interactions and the app catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Postgresql,
}

/// Interaction retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Days an interaction is kept; 0 keeps everything
    pub interaction_days: u32,
    pub sweep_interval_seconds: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            interaction_days: 180,
            sweep_interval_seconds: 3600,
        }
    }
}

impl RetentionConfig {
    pub fn enabled(&self) -> bool {
        self.interaction_days > 0
    }

    /// `None` when the day count does not fit a `TimeDelta`
    pub fn max_age(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(i64::from(self.interaction_days))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

/// Configuration structure for the AVMo AI service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Basic server configuration
    pub address: IpAddr,
    pub port: u16,
    pub service_name: String,
    pub allowed_origins: Vec<String>,

    // Logging
    pub log: String,

    // Storage
    pub backend: Backend,
    pub database_url: Option<String>,
    pub db_pool_max_connections: u32,
    /// JSON file with extra catalog apps loaded at startup
    pub catalog_seed_path: Option<PathBuf>,

    pub recommendation: RecommendationConfig,
    pub optimization: OptimizationConfig,
    pub retention: RetentionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::from([0, 0, 0, 0]),
            port: 8085,
            service_name: "AI Service".to_string(),
            allowed_origins: Vec::new(),
            log: "info".to_string(),
            backend: Backend::default(),
            database_url: None,
            db_pool_max_connections: 10,
            catalog_seed_path: None,
            recommendation: RecommendationConfig::default(),
            optimization: OptimizationConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

impl Config {
    /// Layered provider: the TOML file, then `AVMO_` env vars, over serde defaults.
    /// Nested keys use `__`, e.g. `AVMO_RETENTION__INTERACTION_DAYS`.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG"])
                .split("__"),
        )
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(path)
            .extract()
            .map_err(|e| AvmoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.recommendation.max_limit == 0 {
            return Err(AvmoError::Config(
                "recommendation.max_limit must be at least 1".to_string(),
            ));
        }
        if self.recommendation.default_limit == 0 {
            return Err(AvmoError::Config(
                "recommendation.default_limit must be at least 1".to_string(),
            ));
        }
        if self.recommendation.top_categories == 0 {
            return Err(AvmoError::Config(
                "recommendation.top_categories must be at least 1".to_string(),
            ));
        }
        if self.retention.interaction_days > MAX_RETENTION_DAYS {
            return Err(AvmoError::Config(format!(
                "retention.interaction_days must be at most {} (use 0 to keep everything)",
                MAX_RETENTION_DAYS
            )));
        }
        if self.backend == Backend::Postgresql && self.database_url.is_none() {
            return Err(AvmoError::Config(
                "database_url is required for the postgresql backend".to_string(),
            ));
        }
        if !self.retention.enabled() {
            warn!("⚠️ Interaction retention disabled, history grows without bound");
        }
        Ok(())
    }

    pub fn api_config(&self) -> avmo_api::ApiConfig {
        avmo_api::ApiConfig {
            service_name: self.service_name.clone(),
            allowed_origins: self.allowed_origins.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8085);
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.retention.interaction_days, 180);
        assert_eq!(config.recommendation.default_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_valid() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 8085);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 9000
log = "debug"

[recommendation]
default_limit = 5
cache_ttl_seconds = 60

[retention]
interaction_days = 30
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log, "debug");
        assert_eq!(config.recommendation.default_limit, 5);
        assert!(config.recommendation.cache_enabled());
        assert_eq!(config.recommendation.max_limit, 100);
        assert_eq!(config.retention.interaction_days, 30);
        assert_eq!(config.retention.sweep_interval_seconds, 3600);
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("AVMO_PORT", "7000");
            jail.set_env("AVMO_RETENTION__INTERACTION_DAYS", "0");
            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.port, 7000);
            assert!(!config.retention.enabled());
            Ok(())
        });
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = Config {
            backend: Backend::Postgresql,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AvmoError::Config(_))));
    }

    #[test]
    fn test_top_categories_must_be_positive() {
        let mut config = Config::default();
        config.recommendation.top_categories = 0;
        assert!(matches!(config.validate(), Err(AvmoError::Config(_))));

        config.recommendation.top_categories = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_days_upper_bound() {
        let mut config = Config::default();
        config.retention.interaction_days = MAX_RETENTION_DAYS;
        assert!(config.validate().is_ok());
        assert!(config.retention.max_age().is_some());

        config.retention.interaction_days = MAX_RETENTION_DAYS + 1;
        assert!(matches!(config.validate(), Err(AvmoError::Config(_))));

        config.retention.interaction_days = u32::MAX;
        assert!(config.validate().is_err());
    }
}
