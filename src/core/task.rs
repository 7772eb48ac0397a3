//! Priority-tagged, type-erased units of work.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::future::{self, Promise, TaskFuture};
use super::TaskError;

/// Scheduling priority of a [`Task`]. Higher variants are served first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Served last.
    Lowest,
    /// Below the default.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Above the default.
    High,
    /// Served first.
    Highest,
}

type Body = Box<dyn FnOnce() + Send + 'static>;

/// A one-shot unit of deferred work with a result channel.
///
/// A task is *empty* until a callable is bound with one of the `assign*`
/// methods; running an empty task is a no-op. Binding returns the
/// [`TaskFuture`] through which the caller observes the value, a captured
/// panic, or abandonment if the task is dropped unexecuted.
///
/// Tasks carry no thread affinity: [`run`](Self::run) always executes the
/// callable on the calling thread. The creating thread is recorded only for
/// diagnostics. A worker that blocks on the future of a task queued to its own
/// pool can deadlock; use [`TaskFuture::get_timeout`] when that is possible.
///
/// ```
/// use prometheus_event_pool::core::{Task, TaskPriority};
///
/// let mut task = Task::new(TaskPriority::High);
/// let future = task.assign_with(|(a, b): (i32, i32)| a + b, (2, 3));
/// task.run();
/// assert_eq!(future.get(), Ok(5));
/// ```
pub struct Task {
    priority: TaskPriority,
    origin: ThreadId,
    body: Option<Body>,
}

impl Task {
    /// Create an empty task with the given priority.
    #[must_use]
    pub fn new(priority: TaskPriority) -> Self {
        Self {
            priority,
            origin: thread::current().id(),
            body: None,
        }
    }

    /// Create a task already bound to `func`.
    pub fn from_fn<F, R>(priority: TaskPriority, func: F) -> (Self, TaskFuture<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut task = Self::new(priority);
        let future = task.assign(func);
        (task, future)
    }

    /// Current priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Change the priority. Only meaningful before the task is queued.
    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
    }

    /// Thread that constructed this task.
    #[must_use]
    pub const fn origin_thread(&self) -> ThreadId {
        self.origin
    }

    /// `true` until a callable has been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_none()
    }

    /// Bind a zero-argument callable returning `R`.
    ///
    /// A panic escaping `func` is captured and surfaces as
    /// [`TaskError::Panicked`] from the returned future. Rebinding replaces the
    /// previous callable, whose future then resolves as abandoned.
    #[must_use = "the future is the only way to observe the task's result"]
    pub fn assign<F, R>(&mut self, func: F) -> TaskFuture<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (promise, future) = future::channel();
        self.body = Some(Box::new(move || {
            settle(promise, catch_unwind(AssertUnwindSafe(func)));
        }));
        future
    }

    /// Bind a callable together with its arguments, captured by value.
    #[must_use = "the future is the only way to observe the task's result"]
    pub fn assign_with<F, A, R>(&mut self, func: F, args: A) -> TaskFuture<R>
    where
        F: FnOnce(A) -> R + Send + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        self.assign(move || func(args))
    }

    /// Bind a method of `receiver`; the receiver is the implicit first
    /// argument and is kept alive until the task runs or is dropped.
    #[must_use = "the future is the only way to observe the task's result"]
    pub fn assign_method<O, A, R>(
        &mut self,
        receiver: Arc<O>,
        method: fn(&O, A) -> R,
        args: A,
    ) -> TaskFuture<R>
    where
        O: Send + Sync + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        self.assign(move || method(&receiver, args))
    }

    /// Bind a callable that produces no value.
    ///
    /// The future resolves to `true` on success. A panic is captured and
    /// surfaces as [`TaskError::Panicked`] rather than as `false`, since the
    /// result cell can always carry the failure.
    #[must_use = "the future is the only way to observe the task's result"]
    pub fn assign_status<F>(&mut self, func: F) -> TaskFuture<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        self.assign(move || {
            func();
            true
        })
    }

    /// Execute the bound callable, consuming the task. Empty tasks do nothing.
    pub fn run(self) {
        if let Some(body) = self.body {
            body();
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new(TaskPriority::default())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("priority", &self.priority)
            .field("origin", &self.origin)
            .field("empty", &self.is_empty())
            .finish()
    }
}

fn settle<R>(promise: Promise<R>, outcome: Result<R, Box<dyn Any + Send>>) {
    match outcome {
        Ok(value) => promise.complete(Ok(value)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "Task panicked");
            promise.complete(Err(TaskError::Panicked(message)));
        }
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
