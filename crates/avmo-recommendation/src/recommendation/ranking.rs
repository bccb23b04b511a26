//! Category preference extraction and candidate ranking.
//!
//! Pure functions; the engine wires them to the collaborators.

use std::{cmp::Ordering, collections::{BTreeMap, HashSet}};

use crate::models::{AppRecord, CategoryPreference, InteractionRecord};

/// Sum `usage_time` per category, heaviest first (ties by name ascending).
///
/// Interactions without a category are skipped; negative or non-finite usage
/// contributes nothing.
pub fn derive_category_preferences(history: &[InteractionRecord]) -> Vec<CategoryPreference> {
    let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
    for interaction in history {
        if interaction.category.is_empty() {
            continue;
        }
        let usage = if interaction.usage_time.is_finite() && interaction.usage_time > 0.0 {
            interaction.usage_time
        } else {
            0.0
        };
        *weights.entry(interaction.category.as_str()).or_insert(0.0) += usage;
    }

    let mut preferences: Vec<CategoryPreference> = weights
        .into_iter()
        .map(|(category, weight)| CategoryPreference {
            category: category.to_string(),
            weight,
        })
        .collect();
    preferences.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.category.cmp(&b.category))
    });
    preferences
}

/// Names of the `n` heaviest categories
pub fn top_categories(preferences: &[CategoryPreference], n: usize) -> Vec<String> {
    preferences
        .iter()
        .take(n)
        .map(|p| p.category.clone())
        .collect()
}

/// Ranking order: score desc, popularity desc, id asc
pub fn compare_apps(a: &AppRecord, b: &AppRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.popularity.cmp(&a.popularity))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort, deduplicate by id, drop entries owned by `user_id` and cap at `limit`.
///
/// Entries with a non-finite score are treated as malformed and dropped.
pub fn rank_candidates(candidates: Vec<AppRecord>, user_id: &str, limit: usize) -> Vec<AppRecord> {
    let mut ranked: Vec<AppRecord> = candidates
        .into_iter()
        .filter(|app| app.score.is_finite())
        .filter(|app| app.owner_id.as_deref() != Some(user_id))
        .collect();
    ranked.sort_by(compare_apps);

    let mut seen = HashSet::new();
    ranked.retain(|app| seen.insert(app.id.clone()));
    ranked.truncate(limit);
    ranked
}
