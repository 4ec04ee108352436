//! Concurrent registry integration tests
//!
//! These tests verify that short code uniqueness and click accounting hold
//! when many tasks hit the same registry at once.

use std::collections::HashSet;
use std::sync::Arc;
use tinylink::models::CreateLinkRequest;
use tinylink::registry::{Registry, ValidationError};

#[tokio::test]
async fn test_concurrent_same_custom_code() {
    // Exactly one creation of a contested custom code may win
    let registry = Arc::new(Registry::in_memory());

    let mut handles = vec![];
    for i in 0..10 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .create(
                    CreateLinkRequest::new(format!("https://example.com/{i}"))
                        .with_custom_code("contested"),
                )
                .await
        }));
    }

    let mut success_count = 0;
    let mut collision_count = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => success_count += 1,
            Err(ValidationError::CodeCollision) => collision_count += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(success_count, 1, "Exactly one creation should succeed");
    assert_eq!(collision_count, 9, "All others should collide");
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_generated_codes_are_unique() {
    let registry = Arc::new(Registry::in_memory());

    let mut handles = vec![];
    for _ in 0..20 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let requests = (0..5)
                .map(|_| CreateLinkRequest::new("https://example.com"))
                .collect();
            registry.create_batch(requests).await
        }));
    }

    let mut codes = HashSet::new();
    let mut ids = HashSet::new();
    for handle in handles {
        for outcome in handle.await.unwrap() {
            let link = outcome.unwrap();
            assert!(codes.insert(link.short_code));
            assert!(ids.insert(link.id));
        }
    }

    assert_eq!(codes.len(), 100);
    assert_eq!(registry.len().await, 100);
}

#[tokio::test]
async fn test_concurrent_clicks_and_reads_stay_consistent() {
    let registry = Arc::new(Registry::in_memory());
    let link = registry
        .create(CreateLinkRequest::new("https://example.com"))
        .await
        .unwrap();
    let code = link.short_code.clone();

    let mut writers = vec![];
    for i in 0..200 {
        let registry = Arc::clone(&registry);
        let code = code.clone();
        writers.push(tokio::spawn(async move {
            registry
                .record_click(&code, "direct", &format!("agent-{i}"))
                .await
                .unwrap();
        }));
    }

    let mut readers = vec![];
    for _ in 0..50 {
        let registry = Arc::clone(&registry);
        let code = code.clone();
        readers.push(tokio::spawn(async move {
            let link = registry.get(&code).await.unwrap();
            assert_eq!(link.click_count as usize, link.clicks.len());
        }));
    }

    for handle in writers.into_iter().chain(readers) {
        handle.await.unwrap();
    }

    let link = registry.get(&code).await.unwrap();
    assert_eq!(link.click_count, 200);
    assert_eq!(link.clicks.len(), 200);

    let click_ids: HashSet<i64> = link.clicks.iter().map(|c| c.id).collect();
    assert_eq!(click_ids.len(), 200);

    let stats = registry.stats().await;
    assert_eq!(stats.total_clicks, 200);
}
