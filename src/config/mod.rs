//! Configuration models for thread pools and executors.

pub mod pool;

pub use pool::{resolve_thread_count, ExecutorConfig, ThreadPoolConfig, DEFAULT_THREAD_NAME_PREFIX};
