//! Criterion benchmarks for pipeline interpretation.

use aggregation::{Pipeline, ProjectField};
use criterion::{Criterion, criterion_group, criterion_main};
use doc_store::{DocumentStore, Filter, InMemoryDocumentStore};
use serde_json::json;
use uuid::Uuid;

async fn seed(store: &InMemoryDocumentStore, orders: usize) -> Uuid {
    let profile = Uuid::new_v4();
    for i in 0..orders {
        let event_id = Uuid::new_v4();
        store
            .insert(
                "events",
                json!({
                    "id": event_id.to_string(),
                    "title": format!("brew {i}"),
                    "status": "PENDING",
                    "created_at": format!("2026-08-29T10:{:02}:00Z", i % 60),
                })
                .as_object()
                .unwrap()
                .clone(),
            )
            .await
            .unwrap();
        store
            .insert(
                "orders",
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "user_profile_id": profile.to_string(),
                    "event_id": event_id.to_string(),
                    "status": "PENDING",
                    "created_at": format!("2026-08-29T11:{:02}:00Z", i % 60),
                })
                .as_object()
                .unwrap()
                .clone(),
            )
            .await
            .unwrap();
    }
    profile
}

fn bench_join_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let profile = runtime.block_on(seed(&store, 500));

    let pipeline = Pipeline::collection("orders")
        .match_on(Filter::eq("user_profile_id", profile.to_string()))
        .coerce_id("event_id")
        .lookup("events", "event_id", "id", "event")
        .unwind("event")
        .project(vec![
            ProjectField::new("id", "order_id"),
            ProjectField::new("event.title", "title"),
            ProjectField::new("created_at", "created_at"),
        ])
        .sort_desc("created_at");

    c.bench_function("join_500_orders_to_events", |b| {
        b.to_async(&runtime).iter(|| async {
            let rows: Vec<doc_store::Document> = pipeline.run_typed(&store).await.unwrap();
            assert_eq!(rows.len(), 500);
        });
    });
}

criterion_group!(benches, bench_join_pipeline);
criterion_main!(benches);
