//! Ordered, deduplicated handler storage with same-thread reentrancy detection.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use super::{EventError, Handler};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Ids of registries currently dispatching on this thread.
    static DISPATCHING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

struct DispatchGuard(u64);

impl DispatchGuard {
    fn enter(id: u64) -> Self {
        DISPATCHING.with(|ids| ids.borrow_mut().push(id));
        Self(id)
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|ids| {
            let mut ids = ids.borrow_mut();
            if let Some(pos) = ids.iter().rposition(|id| *id == self.0) {
                ids.remove(pos);
            }
        });
    }
}

/// Handler list of one event.
///
/// Handlers are kept in registration order with no two sharing a
/// [`HandlerKey`](super::HandlerKey). Dispatch holds a shared lock for its
/// whole pass, so it may nest (a handler can notify again, on this or any
/// other event) but a handler must not mutate the list it is being called
/// from. Such a mutation is detected on the dispatching thread and rejected
/// with [`EventError::ReentrantModification`] instead of deadlocking.
pub struct HandlerRegistry<T, S = ()> {
    id: u64,
    handlers: RwLock<Vec<Handler<T, S>>>,
}

impl<T, S> HandlerRegistry<T, S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Whether this thread is inside a dispatch pass of this registry.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        DISPATCHING.with(|ids| ids.borrow().contains(&self.id))
    }

    fn check_not_dispatching(&self) -> Result<(), EventError> {
        if self.is_dispatching() {
            return Err(EventError::ReentrantModification);
        }
        Ok(())
    }

    /// Append `handler` unless an equal binding is already registered.
    ///
    /// Returns whether it was added.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] when called from a handler of
    /// this registry during synchronous dispatch.
    pub fn add(&self, handler: Handler<T, S>) -> Result<bool, EventError> {
        self.check_not_dispatching()?;
        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| h.is_same_binding(&handler)) {
            return Ok(false);
        }
        handlers.push(handler);
        trace!(registry = self.id, count = handlers.len(), "handler added");
        Ok(true)
    }

    /// Remove the handler bound like `handler`. Returns whether one was found.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for [`add`](Self::add).
    pub fn remove(&self, handler: &Handler<T, S>) -> Result<bool, EventError> {
        self.check_not_dispatching()?;
        let mut handlers = self.handlers.write();
        let Some(pos) = handlers.iter().position(|h| h.is_same_binding(handler)) else {
            return Ok(false);
        };
        handlers.remove(pos);
        trace!(registry = self.id, count = handlers.len(), "handler removed");
        Ok(true)
    }

    /// Whether a handler bound like `handler` is registered.
    #[must_use]
    pub fn contains(&self, handler: &Handler<T, S>) -> bool {
        self.handlers
            .read_recursive()
            .iter()
            .any(|h| h.is_same_binding(handler))
    }

    /// Number of registered handlers, including inert ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read_recursive().len()
    }

    /// `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every handler, returning how many were removed.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for [`add`](Self::add).
    pub fn clear(&self) -> Result<usize, EventError> {
        self.check_not_dispatching()?;
        let removed = std::mem::take(&mut *self.handlers.write());
        Ok(removed.len())
    }

    /// Drop method handlers whose receiver no longer exists.
    ///
    /// # Errors
    ///
    /// [`EventError::ReentrantModification`] as for [`add`](Self::add).
    pub fn prune(&self) -> Result<usize, EventError> {
        self.check_not_dispatching()?;
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(Handler::is_live);
        let pruned = before - handlers.len();
        if pruned > 0 {
            trace!(registry = self.id, pruned, "inert handlers pruned");
        }
        Ok(pruned)
    }

    /// Visit every live handler in registration order.
    ///
    /// The list is held under a shared lock for the whole pass; if `visit`
    /// panics the lock and the reentrancy marker are released on unwind.
    pub(crate) fn for_each_live<F>(&self, mut visit: F)
    where
        F: FnMut(&Handler<T, S>),
    {
        let handlers = self.handlers.read_recursive();
        let _guard = DispatchGuard::enter(self.id);
        for handler in handlers.iter().filter(|h| h.is_live()) {
            visit(handler);
        }
    }
}

impl<T, S> Default for HandlerRegistry<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> std::fmt::Debug for HandlerRegistry<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("id", &self.id)
            .field("handlers", &self.len())
            .finish()
    }
}
