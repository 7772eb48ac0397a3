//! Observer-pattern events.
//!
//! An [`Event`] owns an ordered list of [`Handler`]s and notifies them either
//! on the calling thread or as tasks on a [`ThreadPool`](crate::core::ThreadPool).

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod registry;

pub use dispatch::{Event, HandlerFuture};
pub use error::EventError;
pub use handler::{BindingKind, Handler, HandlerKey};
pub use registry::HandlerRegistry;
