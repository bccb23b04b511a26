use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use avmo_recommendation::{
    models::{AppRecord, InteractionRecord, InteractionType},
    recommendation::{derive_category_preferences, rank_candidates},
    store::{MemoryCatalog, MemoryInteractionStore},
    RecommendationConfig, RecommendationEngine,
};

const CATEGORIES: [&str; 6] = [
    "Productivity",
    "Developer Tools",
    "Communication",
    "Internet",
    "Entertainment",
    "Games",
];

fn candidates(n: usize) -> Vec<AppRecord> {
    (0..n)
        .map(|i| {
            AppRecord::new(
                format!("app_{i}"),
                format!("App {i}"),
                CATEGORIES[i % CATEGORIES.len()],
                (i % 50) as f64 / 10.0,
                (i % 100) as u32,
            )
        })
        .collect()
}

fn history(n: usize) -> Vec<InteractionRecord> {
    (0..n)
        .map(|i| InteractionRecord {
            user_id: "bench".to_string(),
            app_id: format!("app_{i}"),
            interaction_type: InteractionType::Launch,
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            usage_time: (i % 60) as f64,
            metadata: Default::default(),
            timestamp: chrono::Utc::now(),
        })
        .collect()
}

fn benchmark_ranking(c: &mut Criterion) {
    let apps = candidates(5_000);
    c.bench_function("rank_candidates_5k", |b| {
        b.iter(|| black_box(rank_candidates(apps.clone(), "bench", 10)))
    });

    let interactions = history(10_000);
    c.bench_function("derive_category_preferences_10k", |b| {
        b.iter(|| black_box(derive_category_preferences(&interactions)))
    });
}

fn benchmark_engine(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = RecommendationEngine::new(
        RecommendationConfig::default(),
        Arc::new(MemoryInteractionStore::new()),
        Arc::new(MemoryCatalog::new(candidates(2_000))),
    );
    runtime.block_on(async {
        for i in 0..200 {
            let metadata = serde_json::json!({
                "category": CATEGORIES[i % CATEGORIES.len()],
                "usageTime": i
            });
            engine
                .record_interaction("bench", "app_0", "launch", metadata.as_object().cloned())
                .await
                .unwrap();
        }
    });

    c.bench_function("personalized_recommendations", |b| {
        b.iter(|| runtime.block_on(engine.get_personalized_recommendations(black_box("bench"), 10)))
    });
    c.bench_function("fallback_recommendations", |b| {
        b.iter(|| runtime.block_on(engine.get_personalized_recommendations(black_box("nobody"), 10)))
    });
}

criterion_group!(benches, benchmark_ranking, benchmark_engine);
criterion_main!(benches);
