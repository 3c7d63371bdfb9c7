// tests/batch_collector.rs

mod common;
use crate::common::{init_tracing, matcher, with_timeout};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use folderwatch::batch::{BatchCollector, Interrupted, PendingBuffer, paths, post_body, unique_paths};
use folderwatch::matcher::{FileMatcher, FileMatcherBuilder};
use folderwatch::types::{FileChangeEntry, FileChangeType};

fn modify(m: &Arc<FileMatcher>, rel: &str) -> FileChangeEntry {
    FileChangeEntry::new(rel, FileChangeType::Modify, Arc::clone(m))
}

fn setup() -> (Arc<PendingBuffer>, BatchCollector, Arc<FileMatcher>) {
    let pending = Arc::new(PendingBuffer::new(64));
    let collector = BatchCollector::new(Arc::clone(&pending));
    let m = matcher(FileMatcherBuilder::new("/proj"));
    (pending, collector, m)
}

#[tokio::test(start_paused = true)]
async fn take_batch_coalesces_a_burst() {
    init_tracing();
    let (pending, collector, m) = setup();
    let cancel = CancellationToken::new();

    let producer = {
        let pending = Arc::clone(&pending);
        let m = Arc::clone(&m);
        tokio::spawn(async move {
            pending.push(modify(&m, "a.txt"));
            sleep(Duration::from_millis(5)).await;
            pending.push(modify(&m, "a.txt"));
            sleep(Duration::from_millis(7)).await;
            pending.push(modify(&m, "a.txt"));
        })
    };

    let start = Instant::now();
    let batch = collector
        .take_batch(Duration::from_millis(20), &cancel)
        .await
        .expect("batch");
    let elapsed = start.elapsed();

    producer.await.unwrap();
    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|e| e.path() == Path::new("a.txt")));
    assert!(
        elapsed >= Duration::from_millis(32) && elapsed < Duration::from_millis(40),
        "batch settled after {elapsed:?}"
    );

    // Silence afterwards: nothing else is pending.
    assert!(pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_become_separate_batches() {
    init_tracing();
    let (pending, collector, m) = setup();
    let cancel = CancellationToken::new();

    let producer = {
        let pending = Arc::clone(&pending);
        let m = Arc::clone(&m);
        tokio::spawn(async move {
            pending.push(modify(&m, "a.txt"));
            sleep(Duration::from_millis(100)).await;
            pending.push(modify(&m, "b.txt"));
        })
    };

    let first = collector.take_batch(Duration::from_millis(20), &cancel).await.unwrap();
    let second = collector.take_batch(Duration::from_millis(20), &cancel).await.unwrap();
    producer.await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].path(), Path::new("a.txt"));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].path(), Path::new("b.txt"));
}

#[tokio::test]
async fn take_returns_queued_entries_immediately() {
    init_tracing();
    let (pending, collector, m) = setup();
    pending.push(modify(&m, "a.txt"));
    pending.push(modify(&m, "b.txt"));

    let batch = with_timeout(collector.take(&CancellationToken::new())).await.unwrap();
    let names: Vec<&Path> = batch.iter().map(FileChangeEntry::path).collect();
    assert_eq!(names, vec![Path::new("a.txt"), Path::new("b.txt")]);
}

#[tokio::test]
async fn interrupted_take_returns_none_and_leaves_state_alone() {
    init_tracing();
    let (pending, collector, m) = setup();
    m.offer(Path::new("/proj/kept.txt"));
    let before = m.matched().unwrap();
    let cancel = CancellationToken::new();

    let waiter = {
        let collector = collector.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { collector.take(&cancel).await })
    };

    tokio::task::yield_now().await;
    cancel.cancel();

    let result = with_timeout(waiter).await.unwrap();
    assert!(result.is_none());
    assert_eq!(m.matched().unwrap(), before);
    assert!(pending.is_empty());
}

#[tokio::test]
async fn cancelled_token_does_not_consume_queued_entries() {
    init_tracing();
    let (pending, collector, m) = setup();
    pending.push(modify(&m, "a.txt"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(collector.take(&cancel).await.is_none());
    assert_eq!(collector.poll(Duration::from_millis(5), &cancel).await, Err(Interrupted));
    assert_eq!(pending.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_times_out_with_none() {
    init_tracing();
    let (_pending, collector, _m) = setup();

    let start = Instant::now();
    let result = collector
        .poll(Duration::from_millis(50), &CancellationToken::new())
        .await;

    assert_eq!(result.map(|b| b.is_none()), Ok(true));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn poll_returns_as_soon_as_data_arrives() {
    init_tracing();
    let (pending, collector, m) = setup();

    {
        let pending = Arc::clone(&pending);
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            pending.push(modify(&m, "late.txt"));
        });
    }

    let start = Instant::now();
    let batch = collector
        .poll(Duration::from_secs(10), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batch.len(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn interrupted_take_batch_discards_partial_batch_only() {
    init_tracing();
    let (pending, collector, m) = setup();
    let cancel = CancellationToken::new();

    {
        let pending = Arc::clone(&pending);
        let cancel = cancel.clone();
        let m = Arc::clone(&m);
        tokio::spawn(async move {
            pending.push(modify(&m, "first.txt"));
            sleep(Duration::from_millis(5)).await;
            cancel.cancel();
            pending.push(modify(&m, "after.txt"));
        });
    }

    let result = collector.take_batch(Duration::from_millis(20), &cancel).await;
    assert!(result.is_none());

    // Let the producer finish; later entries are still there for the next call.
    sleep(Duration::from_millis(1)).await;
    let rest = collector.drain_now();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].path(), Path::new("after.txt"));
}

#[test]
fn batch_helpers_reduce_to_absolute_paths() {
    init_tracing();
    let a = matcher(FileMatcherBuilder::new("/proj"));
    let b = matcher(FileMatcherBuilder::new("/proj/sub"));
    let batch = vec![
        modify(&a, "sub/x.txt"),
        FileChangeEntry::new("x.txt", FileChangeType::Delete, Arc::clone(&b)),
        modify(&a, "y.txt"),
    ];

    assert_eq!(
        paths(&batch),
        vec![
            PathBuf::from("/proj/sub/x.txt"),
            PathBuf::from("/proj/sub/x.txt"),
            PathBuf::from("/proj/y.txt"),
        ]
    );

    let unique = unique_paths(&batch);
    assert_eq!(unique.len(), 2);
    assert_eq!(post_body(&unique), "/proj/sub/x.txt\n/proj/y.txt\n");
}

#[test]
fn entries_compare_by_path_type_and_matcher_identity() {
    init_tracing();
    let a = matcher(FileMatcherBuilder::new("/proj"));
    let twin = matcher(FileMatcherBuilder::new("/proj"));

    assert_eq!(modify(&a, "x.txt"), modify(&a, "x.txt"));
    assert_ne!(modify(&a, "x.txt"), modify(&twin, "x.txt"));
    assert_ne!(
        modify(&a, "x.txt"),
        FileChangeEntry::new("x.txt", FileChangeType::Create, Arc::clone(&a))
    );
}
