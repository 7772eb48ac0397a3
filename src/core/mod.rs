//! Tasks, the priority task queue and the worker thread pool.

pub mod error;
pub mod future;
pub mod task;
pub mod task_queue;
pub mod thread_pool;

pub use error::{AppResult, PoolError, TaskError};
pub use future::{TaskFuture, TaskResult};
pub use task::{Task, TaskPriority};
pub use task_queue::TaskQueue;
pub use thread_pool::{PoolStats, ThreadPool};
