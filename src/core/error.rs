//! Error types for pool and task operations.

use thiserror::Error;

/// Errors produced while building or restarting a thread pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The operating system refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure delivered through a [`TaskFuture`](crate::core::TaskFuture).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The bound callable panicked; carries the panic message.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The task was dropped before it ran (queue cleared, pool torn down, or
    /// submission rejected).
    #[error("task was abandoned before execution")]
    Abandoned,
    /// A deadline-guarded wait elapsed before the task resolved.
    #[error("timed out waiting for task result")]
    Timeout,
}

impl TaskError {
    /// Returns `true` if the task never ran.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
