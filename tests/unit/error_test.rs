//! Tests for error types

use prometheus_event_pool::core::{AppResult, PoolError, TaskError};
use prometheus_event_pool::event::{Event, EventError};

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("thread_name_prefix must not be empty".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: thread_name_prefix must not be empty"
    );
}

#[test]
fn test_spawn_error_from_io() {
    let io = std::io::Error::other("no threads left");
    let err: PoolError = io.into();
    assert!(matches!(err, PoolError::Spawn(_)));
    assert!(format!("{}", err).starts_with("failed to spawn worker thread"));
}

#[test]
fn test_task_errors() {
    assert_eq!(
        format!("{}", TaskError::Panicked("boom".into())),
        "task panicked: boom"
    );
    assert!(TaskError::Abandoned.is_abandoned());
    assert!(!TaskError::Timeout.is_abandoned());
}

#[test]
fn test_event_error_wraps_pool_error() {
    let err = EventError::from(PoolError::InvalidConfig("bad".into()));
    assert!(matches!(err, EventError::Pool(_)));
    assert_eq!(format!("{}", err), "invalid configuration: bad");
}

#[test]
fn test_app_result_accepts_every_error_type() {
    fn run() -> AppResult<()> {
        let event = Event::<u32>::new();
        event.notify_async(&(), 1)?;
        Ok(())
    }
    let err = run().unwrap_err();
    assert!(err.downcast_ref::<EventError>().is_some());
}
