//! Multicast events with synchronous and pooled asynchronous notification.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::ThreadPoolConfig;
use crate::core::{Task, TaskFuture, TaskPriority, ThreadPool};

use super::{EventError, Handler, HandlerRegistry};

/// Per-handler status of an asynchronous notification: `Ok(true)` once the
/// handler returned, `Ok(false)` if its method receiver was dropped before the
/// task ran, an error if it panicked or its task was dropped unrun.
pub type HandlerFuture = TaskFuture<bool>;

/// An observable event carrying an argument `T` from a sender `S`.
///
/// Handlers run in registration order. [`notify`](Self::notify) calls them on
/// the caller's thread; [`notify_async`](Self::notify_async) wraps each one in
/// a [`Task`] on the attached [`ThreadPool`] and returns one
/// [`HandlerFuture`] per handler.
pub struct Event<T, S = ()> {
    handlers: HandlerRegistry<T, S>,
    pool: RwLock<Option<Arc<ThreadPool>>>,
    async_priority: TaskPriority,
}

impl<T: 'static, S: 'static> Event<T, S> {
    /// Event with no handlers and no thread pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HandlerRegistry::new(),
            pool: RwLock::new(None),
            async_priority: TaskPriority::default(),
        }
    }

    /// Event dispatching asynchronously onto a shared pool.
    #[must_use]
    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        let event = Self::new();
        *event.pool.write() = Some(pool);
        event
    }

    /// Attach (or replace) the pool used by `notify_async`.
    pub fn attach_pool(&self, pool: Arc<ThreadPool>) {
        *self.pool.write() = Some(pool);
    }

    /// Detach the pool, returning it. The pool shuts down once the last
    /// reference is gone.
    pub fn detach_pool(&self) -> Option<Arc<ThreadPool>> {
        self.pool.write().take()
    }

    /// Create a private pool from `config` and attach it.
    ///
    /// # Errors
    ///
    /// [`EventError::Pool`] if the pool cannot be built.
    pub fn init_thread_pool(&self, config: ThreadPoolConfig) -> Result<(), EventError> {
        let pool = ThreadPool::with_config(config)?;
        debug!(threads = pool.get_thread_count(), "event thread pool created");
        self.attach_pool(Arc::new(pool));
        Ok(())
    }

    /// The attached pool, if any.
    #[must_use]
    pub fn thread_pool(&self) -> Option<Arc<ThreadPool>> {
        self.pool.read().clone()
    }

    /// Priority given to tasks created by `notify_async`.
    #[must_use]
    pub const fn async_priority(&self) -> TaskPriority {
        self.async_priority
    }

    /// Set the priority given to tasks created by `notify_async`.
    pub fn set_async_priority(&mut self, priority: TaskPriority) {
        self.async_priority = priority;
    }

    /// Register `handler`; duplicates of an existing binding are ignored.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] from inside a synchronous
    /// notification of this event.
    pub fn add_handler(&self, handler: Handler<T, S>) -> Result<bool, EventError> {
        self.handlers.add(handler)
    }

    /// Unregister the handler bound like `handler`.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for
    /// [`add_handler`](Self::add_handler).
    pub fn remove_handler(&self, handler: &Handler<T, S>) -> Result<bool, EventError> {
        self.handlers.remove(handler)
    }

    /// Whether a handler bound like `handler` is registered.
    #[must_use]
    pub fn contains_handler(&self, handler: &Handler<T, S>) -> bool {
        self.handlers.contains(handler)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Unregister every handler.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for
    /// [`add_handler`](Self::add_handler).
    pub fn clear_handlers(&self) -> Result<usize, EventError> {
        self.handlers.clear()
    }

    /// Drop method handlers whose receiver is gone.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for
    /// [`add_handler`](Self::add_handler).
    pub fn prune(&self) -> Result<usize, EventError> {
        self.handlers.prune()
    }
}

impl<T: Clone + 'static, S: 'static> Event<T, S> {
    /// Invoke every live handler in order on the calling thread.
    ///
    /// A panicking handler unwinds out of `notify`; later handlers are not
    /// called.
    pub fn notify(&self, sender: &S, arg: T) {
        self.handlers.for_each_live(|handler| {
            handler.invoke(sender, arg.clone());
        });
    }
}

impl<T, S> Event<T, S>
where
    T: Clone + Send + 'static,
    S: Clone + Send + Sync + 'static,
{
    /// Submit one pool task per live handler and return their futures in
    /// handler order.
    ///
    /// Each task receives its own clone of `sender` and `arg`. A handler that
    /// panics resolves only its own future to an error. If the pool rejects a
    /// task (full queue or shutting down) that future resolves as abandoned.
    ///
    /// # Errors
    ///
    /// [`EventError::NoThreadPool`] if no pool is attached; no task is
    /// created in that case.
    pub fn notify_async(&self, sender: &S, arg: T) -> Result<Vec<HandlerFuture>, EventError> {
        let pool = self.thread_pool().ok_or(EventError::NoThreadPool)?;
        let mut futures = Vec::with_capacity(self.handlers.len());
        self.handlers.for_each_live(|handler| {
            let handler = handler.clone();
            let sender = sender.clone();
            let arg = arg.clone();
            let mut task = Task::new(self.async_priority);
            let future = task.assign(move || handler.invoke(&sender, arg));
            if !pool.push_task(task) {
                warn!("thread pool rejected handler task");
            }
            futures.push(future);
        });
        Ok(futures)
    }
}

impl<S: 'static> Event<(), S> {
    /// [`notify`](Event::notify) for argument-less events.
    pub fn notify_unit(&self, sender: &S) {
        self.notify(sender, ());
    }
}

impl<S: Clone + Send + Sync + 'static> Event<(), S> {
    /// [`notify_async`](Event::notify_async) for argument-less events.
    ///
    /// # Errors
    ///
    /// [`EventError::NoThreadPool`] if no pool is attached.
    pub fn notify_unit_async(&self, sender: &S) -> Result<Vec<HandlerFuture>, EventError> {
        self.notify_async(sender, ())
    }
}

impl<T: 'static, S: 'static> Default for Event<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> std::fmt::Debug for Event<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handlers)
            .field("has_pool", &self.pool.read().is_some())
            .field("async_priority", &self.async_priority)
            .finish()
    }
}
