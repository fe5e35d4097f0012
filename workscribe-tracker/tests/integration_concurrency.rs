//! Integration tests for counter allocation under concurrent writers and
//! lock contention

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use workscribe_config::TrackerConfig;
use workscribe_tracker::{
    counter::AllocateTaskNumber, project::AddProject, Execute, TrackerContext, TrackerError,
    TrackerOperationProcessor,
};

fn context(temp: &TempDir, lock_timeout_ms: u64) -> TrackerContext {
    let mut config = TrackerConfig::default();
    config.store.path = temp.path().join("tracker.db");
    config.store.lock_timeout_ms = lock_timeout_ms;
    TrackerContext::open(config).unwrap()
}

async fn project(ctx: &TrackerContext) -> String {
    let project = AddProject::new("acme", "WS", "Workscribe")
        .execute(ctx)
        .await
        .unwrap();
    project["id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_distinct() {
    let temp = TempDir::new().unwrap();
    let ctx = Arc::new(context(&temp, 5_000));
    let project_id = project(&ctx).await;
    let processor = Arc::new(TrackerOperationProcessor::new().with_max_retries(10));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let ctx = Arc::clone(&ctx);
        let processor = Arc::clone(&processor);
        let op = AllocateTaskNumber::new("acme", project_id.as_str());
        handles.push(tokio::spawn(async move {
            let result = processor.process(&op, &ctx).await.unwrap();
            result["number"].as_i64().unwrap()
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.unwrap()), "number handed out twice");
    }
    assert_eq!(numbers, (1..=32).collect::<HashSet<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_racing_allocations_after_five() {
    let temp = TempDir::new().unwrap();
    let ctx = Arc::new(context(&temp, 5_000));
    let project_id = project(&ctx).await;
    for _ in 0..5 {
        AllocateTaskNumber::new("acme", project_id.as_str())
            .execute(&ctx)
            .await
            .unwrap();
    }

    let a = {
        let ctx = Arc::clone(&ctx);
        let op = AllocateTaskNumber::new("acme", project_id.as_str());
        tokio::spawn(async move { op.execute(&ctx).await.unwrap() })
    };
    let b = {
        let ctx = Arc::clone(&ctx);
        let op = AllocateTaskNumber::new("acme", project_id.as_str());
        tokio::spawn(async move { op.execute(&ctx).await.unwrap() })
    };

    let got: HashSet<i64> = [a.await.unwrap(), b.await.unwrap()]
        .iter()
        .map(|v| v["number"].as_i64().unwrap())
        .collect();
    assert_eq!(got, HashSet::from([6, 7]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_held_lock_surfaces_contention_then_retry_succeeds() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp, 100);
    let project_id = project(&ctx).await;

    // Another writer takes the database write lock and sits on it
    let blocker = rusqlite::Connection::open(temp.path().join("tracker.db")).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

    let op = AllocateTaskNumber::new("acme", project_id.as_str());
    let err = op.execute(&ctx).await.unwrap_err();
    assert!(matches!(err, TrackerError::Contention { .. }));
    assert!(err.is_retryable());

    let release = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(250));
        blocker.execute_batch("ROLLBACK").unwrap();
    });

    let processor = TrackerOperationProcessor::new()
        .with_max_retries(10)
        .with_backoff(Duration::from_millis(50));
    let result = processor.process(&op, &ctx).await.unwrap();
    assert_eq!(result["number"], 1);
    release.join().unwrap();
}

#[tokio::test]
async fn test_processor_gives_up_after_max_retries() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp, 50);
    let project_id = project(&ctx).await;

    let blocker = rusqlite::Connection::open(temp.path().join("tracker.db")).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

    let processor = TrackerOperationProcessor::new()
        .with_max_retries(2)
        .with_backoff(Duration::from_millis(10));
    let result = processor
        .process(&AllocateTaskNumber::new("acme", project_id.as_str()), &ctx)
        .await;
    assert!(matches!(result, Err(TrackerError::Contention { .. })));

    blocker.execute_batch("ROLLBACK").unwrap();
}
