//! Bridge blocking pool primitives onto tokio without stalling its workers.
//!
//! Waiting on a [`TaskFuture`] or draining a [`ThreadPool`] blocks an OS
//! thread. These helpers move that wait onto tokio's blocking thread pool.

use std::sync::Arc;

use tracing::debug;

use crate::core::{TaskError, TaskFuture, TaskResult, ThreadPool};

impl<R: Send + 'static> TaskFuture<R> {
    /// Await the task's outcome from async code.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// The same failures as [`get`](Self::get). If the blocking waiter itself
    /// is cancelled by runtime shutdown, reports [`TaskError::Abandoned`].
    pub async fn wait_async(self) -> TaskResult<R> {
        match tokio::task::spawn_blocking(move || self.get()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, "blocking waiter did not complete");
                Err(TaskError::Abandoned)
            }
        }
    }
}

/// Await every future in order, collecting their outcomes.
pub async fn wait_all_async<R: Send + 'static>(futures: Vec<TaskFuture<R>>) -> Vec<TaskResult<R>> {
    let mut outcomes = Vec::with_capacity(futures.len());
    for future in futures {
        outcomes.push(future.wait_async().await);
    }
    outcomes
}

/// Drain and stop `pool` without blocking the async executor.
///
/// Returns once [`ThreadPool::join_all`] has completed.
pub async fn join_all_async(pool: Arc<ThreadPool>) {
    if let Err(err) = tokio::task::spawn_blocking(move || pool.join_all()).await {
        debug!(error = %err, "join_all task did not complete");
    }
}
