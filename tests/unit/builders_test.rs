//! Tests for builder modules

use prometheus_event_pool::builders::{build_pool, build_pools};
use prometheus_event_pool::config::{ExecutorConfig, ThreadPoolConfig};
use prometheus_event_pool::core::{PoolError, Task, TaskPriority};
use std::collections::HashMap;

#[test]
fn test_build_pools_from_config() {
    let mut pools = HashMap::new();
    pools.insert("events".to_string(), ThreadPoolConfig::new().with_thread_count(2));
    pools.insert("io".to_string(), ThreadPoolConfig::new().with_thread_count(1));
    let cfg = ExecutorConfig { pools };

    let built = build_pools(&cfg).expect("pools built");
    assert_eq!(built.len(), 2);
    assert_eq!(built["events"].get_thread_count(), 2);
    assert_eq!(built["io"].get_thread_count(), 1);
}

#[test]
fn test_build_pool_names_threads_after_pool() {
    let pool = build_pool("events", &ThreadPoolConfig::new().with_thread_count(1))
        .expect("pool built");
    let (task, future) = Task::from_fn(TaskPriority::Medium, || {
        std::thread::current().name().map(str::to_owned)
    });
    assert!(pool.push_task(task));
    let name = future.get().expect("task failed").expect("unnamed worker");
    assert_eq!(name, "events-0");
}

#[test]
fn test_build_pool_keeps_explicit_prefix() {
    let cfg = ThreadPoolConfig::new()
        .with_thread_count(1)
        .with_thread_name_prefix("custom");
    let pool = build_pool("events", &cfg).expect("pool built");
    let (task, future) = Task::from_fn(TaskPriority::Medium, || {
        std::thread::current().name().map(str::to_owned)
    });
    assert!(pool.push_task(task));
    assert_eq!(future.get().unwrap().as_deref(), Some("custom-0"));
}

#[test]
fn test_build_pools_rejects_empty_config() {
    let err = build_pools(&ExecutorConfig::default()).unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}
