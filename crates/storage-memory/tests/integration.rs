use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::task::JoinSet;
use updatelog_storage::{
    GroupId, LatestView, LogStore, LogStoreStreaming, LogStoreWithRetention, NewRecord,
};
use updatelog_storage_memory::MemoryStore;

// Helper to build timestamps from epoch seconds
fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("test timestamps should be in range")
}

fn new_record(group: &str, secs: i64, payload: &str) -> NewRecord {
    NewRecord::new(group, ts(secs), payload.to_string())
}

#[tokio::test]
async fn test_basic_operations() {
    let store = MemoryStore::new();

    // Empty store
    assert_eq!(store.bounds().await.unwrap(), None);
    assert!(store.scan().await.unwrap().is_empty());

    // Append a batch
    let stored = store
        .append(vec![
            new_record("us-east", 100, "entry 1"),
            new_record("us-west", 150, "entry 2"),
            new_record("us-east", 200, "entry 3"),
        ])
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);

    assert_eq!(store.bounds().await.unwrap(), Some((1, 3)));
    assert_eq!(store.count().await.unwrap(), 3);

    // Scans come back in id order
    let all = store.scan().await.unwrap();
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

    let east = store.scan_group(&GroupId::new("us-east")).await.unwrap();
    assert_eq!(east.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
}

#[tokio::test]
async fn test_latest_view_over_store() {
    let store = MemoryStore::new();
    store
        .append(vec![
            new_record("us-east", 100, "stale"),
            new_record("us-west", 150, "only"),
            new_record("us-east", 300, "fresh"),
            new_record("eu-central", 200, "tied loser"),
            new_record("eu-central", 200, "tied winner"),
        ])
        .await
        .unwrap();

    let view = LatestView::new(store);
    let latest = view.query().await.unwrap();

    // One record per group, most recent activity first
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].group, GroupId::new("us-east"));
    assert_eq!(latest[0].payload, Bytes::from("fresh"));
    assert_eq!(latest[1].group, GroupId::new("eu-central"));
    assert_eq!(latest[1].payload, Bytes::from("tied winner"));
    assert_eq!(latest[2].group, GroupId::new("us-west"));

    // Point query agrees with the full reduction
    let east = view
        .latest_for_group(&GroupId::new("us-east"))
        .await
        .unwrap()
        .expect("group should be present");
    assert_eq!(east.payload, Bytes::from("fresh"));
}

#[tokio::test]
async fn test_concurrent_appends() {
    let store = MemoryStore::new();
    let mut tasks = JoinSet::new();

    // 8 writers, each appending a batch of 25 records to its own group
    for writer in 0..8u64 {
        let store = store.clone();
        tasks.spawn(async move {
            let group = format!("writer-{writer}");
            for batch in 0..5i64 {
                let records = (0..5)
                    .map(|i| new_record(&group, batch * 10 + i, "concurrent"))
                    .collect();
                store.append(records).await.unwrap();
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    // No records lost, no ids duplicated
    let all = store.scan().await.unwrap();
    assert_eq!(all.len(), 200);
    let mut ids: Vec<u64> = all.iter().map(|r| r.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 200);
    assert_eq!(store.bounds().await.unwrap(), Some((1, 200)));

    // The view still sees exactly one record per group
    let view = LatestView::new(store);
    let latest = view.query().await.unwrap();
    assert_eq!(latest.len(), 8);
    for record in &latest {
        // Each writer's maximum timestamp is batch 4, offset 4
        assert_eq!(record.created_at, ts(44));
    }
}

#[tokio::test]
async fn test_concurrent_readers() {
    let store = MemoryStore::new();
    store
        .append(vec![
            new_record("a", 100, "entry 1"),
            new_record("a", 200, "entry 2"),
            new_record("b", 150, "entry 3"),
        ])
        .await
        .unwrap();

    let view = LatestView::new(store);
    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let view = view.clone();
        tasks.spawn(async move { view.query().await.unwrap() });
    }

    // Every reader observes the same snapshot
    let mut results = Vec::new();
    while let Some(result) = tasks.join_next().await {
        results.push(result.unwrap());
    }
    for result in &results {
        assert_eq!(result, &results[0]);
    }
}

#[tokio::test]
async fn test_streaming_matches_scan() {
    let store = MemoryStore::new();
    store
        .append(vec![
            new_record("a", 100, "entry 1"),
            new_record("b", 200, "entry 2"),
            new_record("a", 300, "entry 3"),
        ])
        .await
        .unwrap();

    let streamed: Vec<_> = store
        .scan_stream()
        .await
        .unwrap()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|entry| entry.unwrap())
        .collect();

    assert_eq!(streamed, store.scan().await.unwrap());
}

#[tokio::test]
async fn test_retention_keeps_view_correct() {
    let store = MemoryStore::new();
    store
        .append(vec![
            new_record("a", 100, "expired"),
            new_record("a", 500, "kept"),
            new_record("b", 200, "expired"),
        ])
        .await
        .unwrap();

    let removed = store.prune_before(ts(300)).await.unwrap();
    assert_eq!(removed, 2);

    // Group "b" disappeared entirely; group "a" keeps its latest record
    let view = LatestView::new(store);
    let latest = view.query().await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].group, GroupId::new("a"));
    assert_eq!(latest[0].payload, Bytes::from("kept"));
}
