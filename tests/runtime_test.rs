//! Integration tests for the tokio bridge.

#![cfg(feature = "tokio-runtime")]

use futures::future::join_all;
use prometheus_event_pool::core::{Task, TaskError, TaskPriority, ThreadPool};
use prometheus_event_pool::event::{Event, Handler};
use prometheus_event_pool::runtime::{join_all_async, wait_all_async};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

static ASYNC_HITS: AtomicUsize = AtomicUsize::new(0);

fn on_hit(_sender: &(), amount: usize) {
    std::thread::sleep(Duration::from_millis(5));
    ASYNC_HITS.fetch_add(amount, Ordering::SeqCst);
}

fn on_hit_twice(_sender: &(), amount: usize) {
    ASYNC_HITS.fetch_add(amount * 2, Ordering::SeqCst);
}

#[tokio::test]
async fn test_wait_async_resolves_value() {
    let pool = Arc::new(ThreadPool::new(2, 0).expect("Failed to create pool"));

    let futures: Vec<_> = (0..8u64)
        .map(|i| {
            let (task, future) = Task::from_fn(TaskPriority::Medium, move || i + 1);
            assert!(pool.push_task(task));
            future.wait_async()
        })
        .collect();

    let values: Vec<u64> = join_all(futures)
        .await
        .into_iter()
        .map(|r| r.expect("task failed"))
        .collect();
    assert_eq!(values, (1..=8).collect::<Vec<_>>());

    join_all_async(Arc::clone(&pool)).await;
    assert!(!pool.is_running());
}

#[tokio::test]
async fn test_wait_async_reports_abandonment() {
    let (task, future) = Task::from_fn(TaskPriority::Low, || 1u8);
    drop(task);
    assert_eq!(future.wait_async().await, Err(TaskError::Abandoned));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_notification_awaited_from_tokio() {
    let pool = Arc::new(ThreadPool::new(2, 0).expect("Failed to create pool"));
    let event = Event::<usize>::with_pool(Arc::clone(&pool));
    event.add_handler(Handler::function(on_hit)).unwrap();
    event.add_handler(Handler::function(on_hit_twice)).unwrap();

    let futures = event.notify_async(&(), 10).unwrap();
    let outcomes = wait_all_async(futures).await;
    assert_eq!(outcomes, vec![Ok(true), Ok(true)]);
    assert_eq!(ASYNC_HITS.load(Ordering::SeqCst), 30);
}
