//! Bounded, blocking priority queue of [`Task`]s.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

use super::{Task, TaskPriority};

/// Wrapper making a task orderable by priority (highest first) and FIFO
/// within a priority.
struct QueuedTask {
    priority: TaskPriority,
    seq: u64,
    task: Task,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Max-heap: higher priority wins, then lower sequence number.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct QueueState {
    heap: BinaryHeap<QueuedTask>,
    next_seq: u64,
}

/// Thread-safe priority queue with capacity-based admission and a
/// release switch for waking blocked consumers during shutdown.
///
/// Ordering policy: [`TaskPriority::Highest`] is served first; tasks of equal
/// priority come out in push order.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    /// Live count, readable without the lock for the fast-reject path.
    len: AtomicUsize,
    released: AtomicBool,
    capacity: usize,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` tasks (0 = unbounded).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::with_capacity(capacity.min(1024)),
                next_seq: 0,
            }),
            available: Condvar::new(),
            len: AtomicUsize::new(0),
            released: AtomicBool::new(false),
            capacity,
        }
    }

    /// Enqueue `task` if there is room, waking one blocked consumer.
    ///
    /// Returns `false` without blocking when the queue is at capacity; the
    /// rejected task is dropped and its future resolves as abandoned.
    pub fn push(&self, task: Task) -> bool {
        if self.is_full() {
            return false;
        }
        let mut state = self.state.lock();
        // Re-check under the lock so concurrent producers cannot overshoot.
        if self.is_full() {
            return false;
        }
        let seq = state.next_seq;
        state.next_seq = state.next_seq.wrapping_add(1);
        state.heap.push(QueuedTask {
            priority: task.priority(),
            seq,
            task,
        });
        self.len.fetch_add(1, Ordering::SeqCst);
        drop(state);
        self.available.notify_one();
        true
    }

    /// Remove the highest-ordered task, blocking until one is available or
    /// the queue has been [`release`](Self::release)d.
    ///
    /// Returns an empty task when released with nothing queued; callers must
    /// check [`Task::is_empty`].
    pub fn pop(&self) -> Task {
        let mut state = self.state.lock();
        self.available.wait_while(&mut state, |s| {
            s.heap.is_empty() && !self.released.load(Ordering::SeqCst)
        });
        self.take_locked(&mut state).unwrap_or_default()
    }

    /// Non-blocking variant of [`pop`](Self::pop).
    pub fn try_pop(&self) -> Option<Task> {
        let mut state = self.state.lock();
        self.take_locked(&mut state)
    }

    fn take_locked(&self, state: &mut QueueState) -> Option<Task> {
        let queued = state.heap.pop()?;
        self.len.fetch_sub(1, Ordering::SeqCst);
        Some(queued.task)
    }

    /// Let blocked and future consumers fall through with an empty task.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        // Take the lock so a consumer between its predicate check and its
        // wait cannot miss the wakeup.
        let _state = self.state.lock();
        self.available.notify_all();
    }

    /// Re-arm blocking extraction after a [`release`](Self::release).
    pub fn acquire(&self) {
        self.released.store(false, Ordering::SeqCst);
    }

    /// Whether consumers currently fall through instead of blocking.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Discard every queued task. The released flag is unaffected.
    ///
    /// Returns the number of tasks discarded; their futures resolve as
    /// abandoned.
    pub fn clear(&self) -> usize {
        let drained: Vec<QueuedTask> = {
            let mut state = self.state.lock();
            self.len.store(0, Ordering::SeqCst);
            state.heap.drain().collect()
        };
        // Dropped outside the lock: resolving futures wakes their waiters.
        drained.len()
    }

    /// Number of tasks currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    /// `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued tasks (0 = unbounded).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_full(&self) -> bool {
        self.capacity != 0 && self.len() >= self.capacity
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("released", &self.is_released())
            .finish()
    }
}
