//! Fixed-size worker pool executing prioritized [`Task`]s.
//!
//! Workers block on the shared [`TaskQueue`]; nothing polls. Shutdown comes
//! in two shapes:
//!
//! - **Drain** ([`ThreadPool::join_all`]): stop accepting work, wait until the
//!   queue is empty, then stop and join the workers.
//! - **Hard stop** ([`ThreadPool::interrupt`]): stop and join immediately.
//!   Tasks still queued are not executed; their futures stay pending until the
//!   queue is cleared or the pool is dropped, at which point they resolve as
//!   abandoned.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{resolve_thread_count, ThreadPoolConfig};

use super::{PoolError, Task, TaskQueue};

/// Snapshot of pool utilization. Approximate under concurrent mutation,
/// exact at quiescence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of worker threads.
    pub thread_count: usize,
    /// Tasks waiting in the queue.
    pub queued_tasks: usize,
    /// Tasks dequeued and not yet finished.
    pub running_tasks: usize,
    /// Queued plus running.
    pub total_tasks: usize,
    /// Tasks accepted since construction.
    pub submitted_tasks: u64,
    /// Tasks finished since construction.
    pub completed_tasks: u64,
    /// Submissions refused (capacity reached or pool draining).
    pub rejected_tasks: u64,
    /// Whether workers are paused.
    pub paused: bool,
}

/// Lifetime counters (lock-free atomics).
#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    rejected: AtomicU64,
}

/// State shared between the pool handle and its workers.
struct Shared {
    queue: TaskQueue,
    /// Queued plus running; decremented only after a task fully completes.
    total: AtomicUsize,
    paused: AtomicBool,
    /// Permanently draining: no new submissions.
    joined: AtomicBool,
    /// Worker loop active.
    running: AtomicBool,
    /// Bumped by `reset`; workers of an older generation exit.
    generation: AtomicU64,
    pause_lock: Mutex<()>,
    pause_cv: Condvar,
    drain_lock: Mutex<()>,
    drain_cv: Condvar,
    counters: PoolCounters,
}

impl Shared {
    fn wait_while_paused(&self) {
        if !self.paused.load(Ordering::SeqCst) {
            return;
        }
        let mut guard = self.pause_lock.lock();
        self.pause_cv.wait_while(&mut guard, |_| {
            self.paused.load(Ordering::SeqCst) && self.running.load(Ordering::SeqCst)
        });
    }

    fn signal_drained_if_empty(&self) {
        if self.joined.load(Ordering::SeqCst) && self.queue.is_empty() {
            let _guard = self.drain_lock.lock();
            self.drain_cv.notify_all();
        }
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        let _guard = self.pause_lock.lock();
        self.pause_cv.notify_all();
    }
}

/// A fixed set of OS threads consuming a shared prioritized queue.
///
/// ```
/// use prometheus_event_pool::core::{Task, TaskPriority, ThreadPool};
///
/// let pool = ThreadPool::new(2, 0).unwrap();
/// let mut task = Task::new(TaskPriority::Medium);
/// let future = task.assign(|| 6 * 7);
/// assert!(pool.push_task(task));
/// assert_eq!(future.get(), Ok(42));
/// pool.join_all();
/// ```
pub struct ThreadPool {
    config: ThreadPoolConfig,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    thread_count: AtomicUsize,
}

impl ThreadPool {
    /// Create a pool with `thread_count` workers (0 = one per logical CPU)
    /// and a queue bounded at `max_queue_size` (0 = unbounded).
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Spawn` if a worker thread cannot be started.
    pub fn new(thread_count: usize, max_queue_size: usize) -> Result<Self, PoolError> {
        Self::with_config(
            ThreadPoolConfig::new()
                .with_thread_count(thread_count)
                .with_max_queue_size(max_queue_size),
        )
    }

    /// Create a pool from a full configuration.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` if the configuration is invalid
    /// - `PoolError::Spawn` if a worker thread cannot be started
    pub fn with_config(config: ThreadPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;
        let thread_count = config.resolved_thread_count();

        let shared = Arc::new(Shared {
            queue: TaskQueue::new(config.max_queue_size),
            total: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            joined: AtomicBool::new(false),
            running: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            pause_lock: Mutex::new(()),
            pause_cv: Condvar::new(),
            drain_lock: Mutex::new(()),
            drain_cv: Condvar::new(),
            counters: PoolCounters::default(),
        });

        let pool = Self {
            config,
            shared,
            workers: Mutex::new(Vec::with_capacity(thread_count)),
            thread_count: AtomicUsize::new(thread_count),
        };
        pool.spawn_workers(thread_count)?;

        info!(
            thread_count = thread_count,
            max_queue_size = pool.config.max_queue_size,
            "ThreadPool initialized"
        );
        Ok(pool)
    }

    /// Submit a task.
    ///
    /// Returns `false` once the pool is draining ([`join_all`](Self::join_all)
    /// was called) or when the queue is at capacity. A rejected task is dropped
    /// and its future resolves as abandoned.
    pub fn push_task(&self, task: Task) -> bool {
        if self.shared.joined.load(Ordering::SeqCst) {
            self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
            debug!("Task rejected: pool is draining");
            return false;
        }

        // Count before enqueueing so a fast worker never underflows `total`.
        self.shared.total.fetch_add(1, Ordering::SeqCst);
        if self.shared.queue.push(task) {
            self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.shared.total.fetch_sub(1, Ordering::SeqCst);
            self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(
                capacity = self.shared.queue.capacity(),
                "Task rejected: queue is full"
            );
            false
        }
    }

    /// Tasks waiting in the queue.
    #[must_use]
    pub fn get_queued_task_count(&self) -> usize {
        self.shared.queue.len()
    }

    /// Tasks dequeued by a worker and not yet finished.
    #[must_use]
    pub fn get_running_task_count(&self) -> usize {
        self.get_total_task_count()
            .saturating_sub(self.get_queued_task_count())
    }

    /// Unfinished tasks: queued plus running.
    #[must_use]
    pub fn get_total_task_count(&self) -> usize {
        self.shared.total.load(Ordering::SeqCst)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn get_thread_count(&self) -> usize {
        self.thread_count.load(Ordering::SeqCst)
    }

    /// Snapshot of counters and flags.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let queued = self.get_queued_task_count();
        let total = self.get_total_task_count();
        PoolStats {
            thread_count: self.get_thread_count(),
            queued_tasks: queued,
            running_tasks: total.saturating_sub(queued),
            total_tasks: total,
            submitted_tasks: self.shared.counters.submitted.load(Ordering::Relaxed),
            completed_tasks: self.shared.counters.completed.load(Ordering::Relaxed),
            rejected_tasks: self.shared.counters.rejected.load(Ordering::Relaxed),
            paused: self.is_paused(),
        }
    }

    /// Stop workers from starting new tasks. In-flight tasks finish.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        debug!("ThreadPool paused");
    }

    /// Wake every paused worker.
    pub fn resume(&self) {
        self.shared.resume();
        debug!("ThreadPool resumed");
    }

    /// Whether the pool is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Whether the worker loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Discard every queued task. Their futures resolve as abandoned.
    ///
    /// Returns the number of tasks discarded.
    pub fn clear_queue(&self) -> usize {
        let discarded = self.shared.queue.clear();
        self.shared.total.fetch_sub(discarded, Ordering::SeqCst);
        if discarded > 0 {
            debug!(discarded = discarded, "Queued tasks discarded");
        }
        self.shared.signal_drained_if_empty();
        discarded
    }

    /// Hard stop: halt the workers and join them without draining.
    ///
    /// Queued tasks are left in place and are not executed; a worker that has
    /// already dequeued a task finishes it. No-op on a stopped pool.
    pub fn interrupt(&self) {
        if !self.shared.running.load(Ordering::SeqCst) {
            return;
        }
        info!(
            abandoned = self.get_queued_task_count(),
            "Interrupting ThreadPool"
        );
        self.stop_and_join();
    }

    /// Graceful stop: refuse new work, wait for the queue to drain, then halt
    /// and join the workers. A paused pool is resumed so the drain can finish.
    /// Safe to call repeatedly; no-op on a stopped pool.
    pub fn join_all(&self) {
        if !self.shared.running.load(Ordering::SeqCst) {
            return;
        }
        self.shared.joined.store(true, Ordering::SeqCst);
        if self.is_paused() {
            self.resume();
        }

        {
            let mut guard = self.shared.drain_lock.lock();
            self.shared.drain_cv.wait_while(&mut guard, |_| {
                !self.shared.queue.is_empty() && self.shared.running.load(Ordering::SeqCst)
            });
        }

        info!("ThreadPool drained, stopping workers");
        self.stop_and_join();
    }

    /// Interrupt the current workers and respawn, optionally with a new
    /// thread count (0 = one per logical CPU). Tasks left in the queue run on
    /// the new workers. Must not race with [`join_all`](Self::join_all).
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Spawn` if a worker thread cannot be started.
    pub fn reset(&self, thread_count: Option<usize>) -> Result<(), PoolError> {
        self.interrupt();

        let thread_count =
            thread_count.map_or_else(|| self.get_thread_count(), resolve_thread_count);
        self.thread_count.store(thread_count, Ordering::SeqCst);

        // A worker detached by the interrupt (reset from inside a task) must
        // not rejoin the new set once `running` is true again.
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.queue.acquire();
        self.shared.joined.store(false, Ordering::SeqCst);
        self.shared.running.store(true, Ordering::SeqCst);
        self.spawn_workers(thread_count)?;

        info!(thread_count = thread_count, "ThreadPool reset");
        Ok(())
    }

    fn spawn_workers(&self, count: usize) -> Result<(), PoolError> {
        let mut workers = self.workers.lock();
        let generation = self.shared.generation.load(Ordering::SeqCst);
        for worker_id in 0..count {
            let shared = Arc::clone(&self.shared);
            let name = format!("{}-{worker_id}", self.config.thread_name_prefix);
            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = self.config.stack_size {
                builder = builder.stack_size(stack_size);
            }
            match builder.spawn(move || worker_loop(worker_id, generation, &shared)) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    drop(workers);
                    warn!(worker_id = worker_id, error = %e, "Failed to spawn worker thread");
                    self.stop_and_join();
                    return Err(PoolError::Spawn(e));
                }
            }
        }
        Ok(())
    }

    fn stop_and_join(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if self.is_paused() {
            self.shared.resume();
        }
        self.shared.queue.release();
        {
            // Wake a drain waiter so it notices the pool stopped.
            let _guard = self.shared.drain_lock.lock();
            self.shared.drain_cv.notify_all();
        }

        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        let worker_count = handles.len();
        let current = thread::current().id();
        for (idx, handle) in handles.into_iter().enumerate() {
            if handle.thread().id() == current {
                // Stopped from inside one of its own tasks; the loop exits after it.
                warn!(worker_id = idx, "Pool stopped from its own worker - detaching");
                continue;
            }
            join_worker(idx, handle, self.config.join_timeout());
        }

        info!(worker_count = worker_count, "ThreadPool workers stopped");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("stats", &self.stats())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn join_worker(idx: usize, handle: JoinHandle<()>, timeout: Option<Duration>) {
    let Some(timeout) = timeout else {
        if handle.join().is_err() {
            warn!(worker_id = idx, "Worker panicked");
        }
        return;
    };

    // Join on a helper thread so a stuck worker cannot hang shutdown.
    let (tx, rx) = crossbeam_channel::bounded(1);
    let joiner = thread::spawn(move || {
        let _ = tx.send(handle.join().is_ok());
    });
    match rx.recv_timeout(timeout) {
        Ok(true) => {
            debug!(worker_id = idx, "Worker joined successfully");
            let _ = joiner.join();
        }
        Ok(false) => {
            warn!(worker_id = idx, "Worker panicked");
            let _ = joiner.join();
        }
        Err(_) => {
            warn!(worker_id = idx, "Worker did not exit within timeout - detaching");
        }
    }
}

fn worker_loop(worker_id: usize, generation: u64, shared: &Shared) {
    debug!(worker_id = worker_id, "Worker thread started");

    while shared.running.load(Ordering::SeqCst)
        && shared.generation.load(Ordering::SeqCst) == generation
    {
        shared.wait_while_paused();
        shared.signal_drained_if_empty();

        let task = shared.queue.pop();
        if task.is_empty() {
            continue;
        }
        // A pause issued while we were blocked in pop still holds this task back.
        shared.wait_while_paused();
        shared.signal_drained_if_empty();

        task.run();
        shared.total.fetch_sub(1, Ordering::SeqCst);
        shared.counters.completed.fetch_add(1, Ordering::Relaxed);
    }

    debug!(worker_id = worker_id, "Worker thread exiting");
}
