//! # Prometheus Event Pool
//!
//! A prioritized worker thread pool and a typed observer-pattern event
//! system that can notify its handlers synchronously or through the pool.
//!
//! ## Building Blocks
//!
//! - **[`Task`](core::Task)**: a one-shot unit of work with a priority and a
//!   [`TaskFuture`](core::TaskFuture) for its result. Panics inside the task
//!   are captured and delivered through the future.
//! - **[`TaskQueue`](core::TaskQueue)**: a blocking, optionally bounded
//!   priority queue. Highest priority is served first, FIFO within a level.
//! - **[`ThreadPool`](core::ThreadPool)**: fixed-size workers draining the
//!   queue, with pause/resume, graceful drain ([`join_all`](core::ThreadPool::join_all)),
//!   hard stop ([`interrupt`](core::ThreadPool::interrupt)) and
//!   [`reset`](core::ThreadPool::reset).
//! - **[`Event`](event::Event)**: an ordered, deduplicated list of
//!   [`Handler`](event::Handler)s bound to free functions or object methods.
//!
//! ## Thread Pool
//!
//! ```rust
//! use prometheus_event_pool::core::{Task, TaskPriority, ThreadPool};
//!
//! let pool = ThreadPool::new(2, 0)?;
//! let mut futures = Vec::new();
//! for i in 0..10u64 {
//!     let mut task = Task::new(TaskPriority::Medium);
//!     futures.push(task.assign(move || i * i));
//!     assert!(pool.push_task(task));
//! }
//! pool.join_all();
//! let sum: u64 = futures.into_iter().map(|f| f.get().unwrap()).sum();
//! assert_eq!(sum, 285);
//! # Ok::<(), prometheus_event_pool::core::PoolError>(())
//! ```
//!
//! ## Events
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use prometheus_event_pool::config::ThreadPoolConfig;
//! use prometheus_event_pool::event::{Event, Handler};
//!
//! struct Counter(AtomicUsize);
//!
//! impl Counter {
//!     fn on_tick(&self, _sender: &(), step: usize) {
//!         self.0.fetch_add(step, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(Counter(AtomicUsize::new(0)));
//! let event = Event::<usize>::new();
//! event.add_handler(Handler::method(&counter, Counter::on_tick))?;
//! event.notify(&(), 2);
//!
//! event.init_thread_pool(ThreadPoolConfig::new().with_thread_count(1))?;
//! for future in event.notify_async(&(), 3)? {
//!     assert_eq!(future.get(), Ok(true));
//! }
//! assert_eq!(counter.0.load(Ordering::SeqCst), 5);
//! # Ok::<(), prometheus_event_pool::event::EventError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Tasks, the priority task queue and the worker thread pool.
pub mod core;
/// Configuration models for pools and executors.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Handlers and events with synchronous and pooled notification.
pub mod event;
/// Async adapters for tokio callers.
pub mod runtime;
/// Shared utilities.
pub mod util;
