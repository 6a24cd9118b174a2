//! End-to-end flows: provision, bulk-load, count, and search against the
//! in-memory store.

use std::sync::Arc;

use pantry::{
    provision, IngestError, IngestOutcome, MemoryStore, Recipe, ServiceConfig, ServiceError,
    StoreError,
};

fn config() -> ServiceConfig {
    ServiceConfig::new("pantry", "recipes").with_dimensions(8)
}

fn axis(index: usize) -> Vec<f32> {
    let mut v = vec![0.0; 8];
    v[index] = 1.0;
    v
}

#[tokio::test]
async fn provision_twice_yields_one_collection() {
    let store = Arc::new(MemoryStore::new());
    let first = provision(store.clone(), &config()).await.expect("first");
    let second = provision(store.clone(), &config()).await.expect("second");

    assert_eq!(first.collection(), second.collection());

    // Writes through one handle are visible through the other: same
    // collection, not a duplicate.
    first
        .ingest(vec![Recipe::named("Pho").with_embedding(axis(0))])
        .await
        .expect("ingest");
    assert_eq!(second.total().await.expect("total"), 1);
}

#[tokio::test]
async fn incompatible_reprovision_is_a_configuration_conflict() {
    let store = Arc::new(MemoryStore::new());
    let _ = provision(store.clone(), &config()).await.expect("first");

    let result = provision(store, &config().with_dimensions(1536)).await;
    match result {
        Err(ServiceError::Store(StoreError::ConfigurationConflict { collection, .. })) => {
            assert_eq!(collection, "recipes");
        }
        other => panic!("expected configuration conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn derived_ids_and_counts_line_up() {
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    let report = service
        .ingest(vec![
            Recipe::named("Beef Wellington").with_embedding(axis(0)),
            Recipe::named("Pad Thai").with_embedding(axis(1)),
            Recipe::named("Shepherd's Pie"),
        ])
        .await
        .expect("batch completes");

    assert_eq!(report.created(), 3);
    assert!(report.is_complete_success());
    let ids: Vec<&str> = report.outcomes.iter().map(IngestOutcome::id).collect();
    assert_eq!(ids, ["BeefWellington", "PadThai", "Shepherd'sPie"]);

    // count(true) reflects exactly the recipes carrying embeddings.
    assert_eq!(service.count(true).await.expect("count"), 2);
    assert_eq!(service.count(false).await.expect("count"), 1);
}

#[tokio::test]
async fn reingesting_a_derived_id_is_a_create_conflict() {
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    service
        .ingest(vec![Recipe::named("Pad Thai").with_embedding(axis(0))])
        .await
        .expect("first batch");

    // Same name modulo whitespace, so the same derived identity.
    let report = service
        .ingest(vec![
            Recipe::named("PadThai").with_embedding(axis(1)),
            Recipe::named("Laksa").with_embedding(axis(2)),
        ])
        .await
        .expect("second batch completes despite the conflict");

    assert_eq!(report.created(), 1);
    let (id, error) = report.failures().next().expect("one failure");
    assert_eq!(id, "PadThai");
    assert!(matches!(error, IngestError::DuplicateIdentifier { .. }));

    // The original document is untouched: create-only, never upsert.
    let hits = service.search(&axis(0), 1).await.expect("search");
    assert_eq!(hits[0].recipe.id.as_deref(), Some("PadThai"));
    assert_eq!(hits[0].recipe.embedding, Some(axis(0)));
}

#[tokio::test]
async fn tied_top_scores_match_the_worked_example() {
    // A and C share an embedding, B is orthogonal; querying with that
    // embedding ties A and C at ~1.0 and leaves B at ~0.0.
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    service
        .ingest(vec![
            Recipe::named("A").with_embedding(axis(0)),
            Recipe::named("B").with_embedding(axis(1)),
            Recipe::named("C").with_embedding(axis(0)),
        ])
        .await
        .expect("batch completes");

    let hits = service.search(&axis(0), 3).await.expect("search");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].recipe.name, "A");
    assert_eq!(hits[1].recipe.name, "C");
    assert_eq!(hits[2].recipe.name, "B");
    assert!((hits[0].score - 1.0).abs() < 1e-9);
    assert!((hits[1].score - 1.0).abs() < 1e-9);
    assert!(hits[2].score.abs() < 1e-9);
}

#[tokio::test]
async fn single_document_with_k_three_returns_one_hit() {
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    service
        .ingest(vec![Recipe::named("Solo").with_embedding(axis(4))])
        .await
        .expect("batch completes");

    let hits = service.search_top(&axis(4)).await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].recipe.name, "Solo");
}

#[tokio::test]
async fn roundtrip_self_query_scores_near_maximum() {
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    let embedding = vec![0.3, -0.2, 0.9, 0.1, 0.0, -0.5, 0.4, 0.7];
    service
        .ingest(vec![
            Recipe::named("Target").with_embedding(embedding.clone()),
            Recipe::named("Noise").with_embedding(axis(5)),
        ])
        .await
        .expect("batch completes");

    let hits = service.search(&embedding, 3).await.expect("search");
    assert_eq!(hits[0].recipe.name, "Target");
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn search_results_are_ordered_for_arbitrary_vectors() {
    let store = Arc::new(MemoryStore::new());
    let service = provision(store, &config()).await.expect("provision");

    let recipes: Vec<Recipe> = (0..8)
        .map(|i| Recipe::named(format!("Recipe {i}")).with_embedding(axis(i)))
        .collect();
    service.ingest(recipes).await.expect("batch completes");

    let query = vec![0.7, 0.1, 0.0, 0.4, 0.0, 0.2, 0.0, 0.1];
    let hits = service.search(&query, 5).await.expect("search");

    assert_eq!(hits.len(), 5);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(hits[0].recipe.name, "Recipe 0");
}

#[tokio::test]
async fn concurrent_searches_share_one_service() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(provision(store, &config()).await.expect("provision"));

    service
        .ingest(vec![
            Recipe::named("A").with_embedding(axis(0)),
            Recipe::named("B").with_embedding(axis(1)),
        ])
        .await
        .expect("batch completes");

    let mut handles = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.search(&axis(i % 2), 2).await.expect("search")
        }));
    }
    for handle in handles {
        let hits = handle.await.expect("task completes");
        assert_eq!(hits.len(), 2);
    }
}
