//! Tests for configuration validation

use prometheus_event_pool::config::{ExecutorConfig, ThreadPoolConfig, DEFAULT_THREAD_NAME_PREFIX};
use std::time::Duration;

#[test]
fn test_pool_config_validation() {
    let valid = ThreadPoolConfig {
        thread_count: 4,
        max_queue_size: 128,
        thread_name_prefix: "io".to_string(),
        stack_size: Some(512 * 1024),
        join_timeout_ms: Some(1_000),
    };
    assert!(valid.validate().is_ok());
    assert_eq!(valid.join_timeout(), Some(Duration::from_secs(1)));
}

#[test]
fn test_pool_config_invalid_prefix() {
    let invalid = ThreadPoolConfig {
        thread_name_prefix: String::new(),
        ..ThreadPoolConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_thread_count_resolves_to_cpus() {
    let cfg = ThreadPoolConfig::default();
    assert_eq!(cfg.thread_count, 0);
    assert_eq!(cfg.resolved_thread_count(), num_cpus::get().max(1));
}

#[test]
fn test_executor_config_from_json() {
    let json = r#"{
        "pools": {
            "events": { "thread_count": 2, "max_queue_size": 64 },
            "io": { "thread_count": 1, "thread_name_prefix": "io", "join_timeout_ms": 500 }
        }
    }"#;
    let cfg = ExecutorConfig::from_json_str(json).expect("valid config");
    assert_eq!(cfg.pools.len(), 2);
    assert_eq!(cfg.pools["events"].max_queue_size, 64);
    assert_eq!(cfg.pools["events"].thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    assert_eq!(cfg.pools["io"].join_timeout_ms, Some(500));
}

#[test]
fn test_executor_config_requires_pools() {
    assert!(ExecutorConfig::default().validate().is_err());
    assert!(ExecutorConfig::from_json_str(r#"{"pools": {}}"#).is_err());
}

#[test]
fn test_executor_config_names_invalid_pool() {
    let json = r#"{"pools": {"broken": {"stack_size": 0}}}"#;
    let err = ExecutorConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("broken"), "unexpected message: {err}");
}

#[test]
fn test_executor_config_rejects_malformed_json() {
    let err = ExecutorConfig::from_json_str("{ pools: ").unwrap_err();
    assert!(err.starts_with("parse error"));
}
