//! Periodic purge of old interaction and feature usage records.

use std::sync::Arc;

use chrono::Utc;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use avmo_common::{AvmoError, Result};
use avmo_recommendation::{analytics::FeatureUsageStore, store::InteractionStore};

use crate::RetentionConfig;

/// Drop interactions and feature usage older than the configured age.
/// Returns the number of records removed.
pub async fn sweep_once(
    interactions: &dyn InteractionStore,
    feature_usage: &dyn FeatureUsageStore,
    config: &RetentionConfig,
) -> Result<usize> {
    if !config.enabled() {
        return Ok(0);
    }
    let cutoff = config
        .max_age()
        .and_then(|max_age| Utc::now().checked_sub_signed(max_age))
        .ok_or_else(|| {
            AvmoError::Config(format!(
                "retention of {} days is out of range",
                config.interaction_days
            ))
        })?;
    let removed = interactions.purge_older_than(cutoff).await?
        + feature_usage.purge_older_than(cutoff).await?;
    if removed > 0 {
        info!("🧹 Purged {} records older than {}", removed, cutoff);
    } else {
        debug!("🧹 Retention sweep found nothing older than {}", cutoff);
    }
    Ok(removed)
}

/// Run [`sweep_once`] on an interval until the task is aborted.
///
/// Returns `None` when retention is disabled.
pub fn spawn_sweeper(
    interactions: Arc<dyn InteractionStore>,
    feature_usage: Arc<dyn FeatureUsageStore>,
    config: RetentionConfig,
) -> Option<JoinHandle<()>> {
    if !config.enabled() {
        info!("♾️ Interaction retention disabled");
        return None;
    }

    info!(
        "⏰ Retention sweeper every {:?}, keeping {} days",
        config.sweep_interval(),
        config.interaction_days
    );

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.sweep_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_once(interactions.as_ref(), feature_usage.as_ref(), &config).await {
                warn!(error = %e, "⚠️ Retention sweep failed");
            }
        }
    }))
}
