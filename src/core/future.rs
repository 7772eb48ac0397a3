//! One-shot result cell shared between a [`Task`](crate::core::Task) and the
//! caller awaiting it.
//!
//! The producing half (`Promise`) lives inside the task body; the consuming
//! half ([`TaskFuture`]) is handed to the caller. Waiting uses a
//! `parking_lot` Condvar, never polling. A promise dropped without being
//! fulfilled resolves the cell to [`TaskError::Abandoned`], so a waiter never
//! blocks on a task that no longer exists.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::TaskError;

/// Outcome carried by the cell.
pub type TaskResult<R> = Result<R, TaskError>;

/// Result slot state.
#[derive(Debug)]
enum SlotState<R> {
    /// Waiting for the task to resolve.
    Pending,
    /// Outcome is available.
    Ready(TaskResult<R>),
    /// Outcome was moved out by the consumer.
    Taken,
}

struct Slot<R> {
    state: Mutex<SlotState<R>>,
    ready: Condvar,
}

impl<R> Slot<R> {
    fn resolve(&self, outcome: TaskResult<R>) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Pending) {
            *state = SlotState::Ready(outcome);
            self.ready.notify_all();
        }
    }
}

/// Create a linked promise/future pair.
pub(crate) fn channel<R>() -> (Promise<R>, TaskFuture<R>) {
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState::Pending),
        ready: Condvar::new(),
    });
    (
        Promise {
            slot: Some(Arc::clone(&slot)),
        },
        TaskFuture { slot },
    )
}

/// Producing half of the cell. Resolves exactly once.
pub(crate) struct Promise<R> {
    slot: Option<Arc<Slot<R>>>,
}

impl<R> Promise<R> {
    pub(crate) fn complete(mut self, outcome: TaskResult<R>) {
        if let Some(slot) = self.slot.take() {
            slot.resolve(outcome);
        }
    }
}

impl<R> Drop for Promise<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.resolve(Err(TaskError::Abandoned));
        }
    }
}

/// Handle to the deferred result of a [`Task`](crate::core::Task).
///
/// Supports a non-blocking poll ([`is_ready`](Self::is_ready)), blocking
/// waits with and without a deadline, and consuming retrieval of the value or
/// failure. There is no cancellation of an already-dispatched task.
pub struct TaskFuture<R> {
    slot: Arc<Slot<R>>,
}

impl<R> TaskFuture<R> {
    /// Returns `true` once the task has resolved (value, failure or
    /// abandonment). Never blocks.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(*self.slot.state.lock(), SlotState::Pending)
    }

    /// Block until the task resolves.
    pub fn wait(&self) {
        let mut state = self.slot.state.lock();
        self.slot
            .ready
            .wait_while(&mut state, |s| matches!(s, SlotState::Pending));
    }

    /// Block until the task resolves or `timeout` elapses.
    ///
    /// Returns `true` if the task resolved within the deadline.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut state = self.slot.state.lock();
        let result = self
            .slot
            .ready
            .wait_while_for(&mut state, |s| matches!(s, SlotState::Pending), timeout);
        !result.timed_out() || !matches!(*state, SlotState::Pending)
    }

    /// Block until the task resolves and return its outcome.
    ///
    /// # Errors
    ///
    /// - [`TaskError::Panicked`] if the callable panicked
    /// - [`TaskError::Abandoned`] if the task was dropped without running
    pub fn get(self) -> TaskResult<R> {
        self.wait();
        self.take()
    }

    /// Like [`get`](Self::get) but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Timeout`] if the deadline passes first, otherwise
    /// the same failures as [`get`](Self::get).
    pub fn get_timeout(self, timeout: Duration) -> TaskResult<R> {
        if self.wait_timeout(timeout) {
            self.take()
        } else {
            Err(TaskError::Timeout)
        }
    }

    fn take(&self) -> TaskResult<R> {
        let mut state = self.slot.state.lock();
        match std::mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(outcome) => outcome,
            // get() consumes the future, so the slot is never read twice.
            SlotState::Pending | SlotState::Taken => Err(TaskError::Abandoned),
        }
    }
}

impl<R> std::fmt::Debug for TaskFuture<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}
