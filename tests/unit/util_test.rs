//! Tests for utility functions

use prometheus_event_pool::core::TaskPriority;
use prometheus_event_pool::util::{init_tracing, DEFAULT_LOG_FILTER};

#[test]
fn test_priority_ordering() {
    assert!(TaskPriority::Highest > TaskPriority::High);
    assert!(TaskPriority::High > TaskPriority::Medium);
    assert!(TaskPriority::Medium > TaskPriority::Low);
    assert!(TaskPriority::Low > TaskPriority::Lowest);
    assert_eq!(TaskPriority::default(), TaskPriority::Medium);
}

#[test]
fn test_priority_serde_names() {
    let json = serde_json::to_string(&TaskPriority::Highest).unwrap();
    assert_eq!(json, "\"highest\"");
    let parsed: TaskPriority = serde_json::from_str("\"low\"").unwrap();
    assert_eq!(parsed, TaskPriority::Low);
}

#[test]
fn test_init_tracing_is_idempotent() {
    assert!(DEFAULT_LOG_FILTER.starts_with("prometheus_event_pool"));
    init_tracing();
    assert!(!init_tracing());
}
