//! Concurrent reads and writes against one engine.

use std::{collections::HashSet, sync::Arc};

use avmo_ai::{recommendation::store::InteractionStore, service::build_services, Config};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_interactions_and_reads() {
    let services = build_services(&Config::default()).await.unwrap();
    let engine = Arc::clone(&services.state.engine);

    let mut tasks = Vec::new();
    for i in 0..32 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::spawn(async move {
            let user = format!("user_{}", i % 4);
            let metadata = serde_json::json!({"category": "Productivity", "usageTime": i})
                .as_object()
                .cloned();
            engine
                .record_interaction(&user, "app_1", "view", metadata)
                .await
                .unwrap();

            let apps = engine.get_personalized_recommendations(&user, 5).await;
            assert!(!apps.is_empty());
            let ids: HashSet<_> = apps.iter().map(|a| a.id.clone()).collect();
            assert_eq!(ids.len(), apps.len());
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stats = engine.statistics().await;
    assert_eq!(stats.interactions_recorded, 32);
    assert_eq!(stats.total_requests, 32);
    assert_eq!(services.interactions.history("user_0").await.unwrap().len(), 8);
}
