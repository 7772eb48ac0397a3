//! Error types for event registration and dispatch.

use thiserror::Error;

use crate::core::PoolError;

/// Errors produced by [`Event`](crate::event::Event) operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// `notify_async` was called with no thread pool attached.
    #[error("no thread pool configured for asynchronous notification")]
    NoThreadPool,
    /// A handler tried to modify the handler list of the event that is
    /// currently dispatching to it on the same thread.
    #[error("handler list modified from inside its own notification")]
    ReentrantModification,
    /// Creating the event's private thread pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl EventError {
    /// Returns `true` for the missing-dependency configuration error.
    #[must_use]
    pub const fn is_missing_pool(&self) -> bool {
        matches!(self, Self::NoThreadPool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error_display() {
        assert_eq!(
            EventError::NoThreadPool.to_string(),
            "no thread pool configured for asynchronous notification"
        );
        assert_eq!(
            EventError::ReentrantModification.to_string(),
            "handler list modified from inside its own notification"
        );
        let err: EventError =
            PoolError::InvalidConfig("stack_size must be greater than 0".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: stack_size must be greater than 0"
        );
        assert!(EventError::NoThreadPool.is_missing_pool());
    }
}
