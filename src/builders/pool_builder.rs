//! Builders to construct thread pools from executor configuration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::{ExecutorConfig, ThreadPoolConfig};
use crate::core::{PoolError, ThreadPool};

/// Build a single named pool, prefixing its worker threads with `name`
/// unless the configuration names them explicitly.
///
/// # Errors
///
/// [`PoolError::InvalidConfig`] or [`PoolError::Spawn`] from pool creation.
pub fn build_pool(name: &str, cfg: &ThreadPoolConfig) -> Result<Arc<ThreadPool>, PoolError> {
    let mut cfg = cfg.clone();
    if cfg.thread_name_prefix == crate::config::DEFAULT_THREAD_NAME_PREFIX {
        cfg.thread_name_prefix = name.to_string();
    }
    let pool = ThreadPool::with_config(cfg)?;
    info!(pool = name, threads = pool.get_thread_count(), "pool built");
    Ok(Arc::new(pool))
}

/// Build every pool described by `cfg`, keyed by pool name.
///
/// Pools are shared (`Arc`) so events and callers can hold the same pool.
///
/// # Errors
///
/// [`PoolError::InvalidConfig`] if validation fails, or the first pool
/// creation error. Pools already built are shut down when dropped.
pub fn build_pools(cfg: &ExecutorConfig) -> Result<HashMap<String, Arc<ThreadPool>>, PoolError> {
    cfg.validate()
        .map_err(|e| PoolError::InvalidConfig(format!("config invalid: {e}")))?;

    let mut pools = HashMap::with_capacity(cfg.pools.len());
    for (name, pool_cfg) in &cfg.pools {
        let pool = build_pool(name, pool_cfg)?;
        pools.insert(name.clone(), pool);
    }

    Ok(pools)
}
