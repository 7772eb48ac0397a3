//! Thread pool and executor configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default prefix for worker thread names.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "ep-worker";

/// Configuration for a single [`ThreadPool`](crate::core::ThreadPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadPoolConfig {
    /// Worker thread count. 0 means one thread per logical CPU.
    pub thread_count: usize,
    /// Maximum queued tasks before `push_task` rejects. 0 means unbounded.
    pub max_queue_size: usize,
    /// Prefix for worker thread names (`{prefix}-{index}`).
    pub thread_name_prefix: String,
    /// Optional worker stack size in bytes.
    pub stack_size: Option<usize>,
    /// Optional per-worker join deadline (milliseconds) used when stopping;
    /// a worker that misses it is detached. `None` waits indefinitely.
    pub join_timeout_ms: Option<u64>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            thread_count: 0,
            max_queue_size: 0,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
            join_timeout_ms: None,
        }
    }
}

impl ThreadPoolConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count (0 = one per logical CPU).
    #[must_use]
    pub const fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set the queue capacity (0 = unbounded).
    #[must_use]
    pub const fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker stack size in bytes.
    #[must_use]
    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Set the per-worker join deadline used when stopping the pool.
    #[must_use]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Effective worker count after resolving 0 to the CPU count.
    #[must_use]
    pub fn resolved_thread_count(&self) -> usize {
        resolve_thread_count(self.thread_count)
    }

    /// Join deadline as a `Duration`, if configured.
    #[must_use]
    pub fn join_timeout(&self) -> Option<Duration> {
        self.join_timeout_ms.map(Duration::from_millis)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        if self.stack_size == Some(0) {
            return Err("stack_size must be greater than 0".into());
        }
        if self.join_timeout_ms == Some(0) {
            return Err("join_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Resolve a requested worker count, mapping 0 to the logical CPU count.
#[must_use]
pub fn resolve_thread_count(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

/// Root configuration describing a set of named pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, ThreadPoolConfig>,
}

impl ExecutorConfig {
    /// Validate all pools and ensure at least one pool exists.
    ///
    /// # Errors
    ///
    /// Returns a description naming the first invalid pool.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse executor configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ThreadPoolConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
        assert!(cfg.resolved_thread_count() >= 1);
    }

    #[test]
    fn test_builder_setters() {
        let cfg = ThreadPoolConfig::new()
            .with_thread_count(3)
            .with_max_queue_size(64)
            .with_thread_name_prefix("io")
            .with_stack_size(256 * 1024)
            .with_join_timeout(Duration::from_secs(2));
        assert_eq!(cfg.resolved_thread_count(), 3);
        assert_eq!(cfg.max_queue_size, 64);
        assert_eq!(cfg.thread_name_prefix, "io");
        assert_eq!(cfg.stack_size, Some(256 * 1024));
        assert_eq!(cfg.join_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_invalid_fields() {
        assert!(ThreadPoolConfig::new()
            .with_thread_name_prefix("  ")
            .validate()
            .is_err());
        assert!(ThreadPoolConfig::new().with_stack_size(0).validate().is_err());
        assert!(ThreadPoolConfig::new()
            .with_join_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: ThreadPoolConfig = serde_json::from_str(r#"{"thread_count": 2}"#).unwrap();
        assert_eq!(cfg.thread_count, 2);
        assert_eq!(cfg.max_queue_size, 0);
        assert_eq!(cfg.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    }
}
