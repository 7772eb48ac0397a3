//! Async adapters for callers living on a tokio runtime.

#[cfg(feature = "tokio-runtime")]
pub mod tokio_bridge;

#[cfg(feature = "tokio-runtime")]
pub use tokio_bridge::{join_all_async, wait_all_async};
