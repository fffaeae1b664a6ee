// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pool registry
//!
//! Tracks every created pool by name for monitoring and administration. An
//! explicit object injected into the guard — tests get an isolated registry
//! per case instead of sharing hidden global state.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::pool::{ConnectionPool, PoolError};

/// Process-wide pool registry. Lives for the process lifetime; pools are
/// closed through [`PoolManager::shutdown_all`] at process exit.
#[derive(Default)]
pub struct PoolManager {
    pools: RwLock<HashMap<String, Arc<dyn ConnectionPool>>>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool under its name.
    ///
    /// Names are unique: registering a second pool under an existing name
    /// fails with [`PoolError::Creation`] and leaves the first registration
    /// untouched.
    pub fn register(&self, pool: Arc<dyn ConnectionPool>) -> Result<(), PoolError> {
        let name = pool.name().to_string();
        let mut pools = self.pools.write();

        if pools.contains_key(&name) {
            warn!(pool = %name, "rejecting duplicate pool registration");
            return Err(PoolError::Creation(format!(
                "a pool named '{name}' is already registered"
            )));
        }

        info!(pool = %name, "registered connection pool");
        pools.insert(name, pool);
        Ok(())
    }

    /// Look up a registered pool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ConnectionPool>> {
        self.pools.read().get(name).cloned()
    }

    /// Names of all registered pools, for administration surfaces.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }

    /// Close every registered pool. Called once at process shutdown.
    pub async fn shutdown_all(&self) {
        // Drain under the lock, close outside it
        let pools: Vec<(String, Arc<dyn ConnectionPool>)> =
            self.pools.write().drain().collect();

        for (name, pool) in pools {
            info!(pool = %name, "closing connection pool");
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::{PoolConnection, PoolStats};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct NullPool {
        name: String,
        closed: AtomicBool,
    }

    impl NullPool {
        fn named(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                closed: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ConnectionPool for NullPool {
        fn name(&self) -> &str {
            &self.name
        }

        async fn acquire(&self) -> Result<Box<dyn PoolConnection>, PoolError> {
            Err(PoolError::Exhausted {
                waited: std::time::Duration::ZERO,
            })
        }

        fn stats(&self) -> PoolStats {
            PoolStats::default()
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let manager = PoolManager::new();
        manager.register(NullPool::named("cache")).unwrap();

        assert!(manager.get("cache").is_some());
        assert!(manager.get("other").is_none());
        assert_eq!(manager.names(), vec!["cache".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let manager = PoolManager::new();
        manager.register(NullPool::named("cache")).unwrap();

        let err = manager.register(NullPool::named("cache")).unwrap_err();
        assert!(matches!(err, PoolError::Creation(_)));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_names_are_independent() {
        let manager = PoolManager::new();
        manager.register(NullPool::named("cache")).unwrap();
        manager.register(NullPool::named("reporting")).unwrap();

        assert_eq!(manager.len(), 2);
        assert_eq!(
            manager.names(),
            vec!["cache".to_string(), "reporting".to_string()]
        );
    }

    #[tokio::test]
    async fn test_shutdown_all_closes_and_drains() {
        let manager = PoolManager::new();
        let pool = NullPool::named("cache");
        manager.register(pool.clone()).unwrap();

        manager.shutdown_all().await;

        assert!(pool.closed.load(Ordering::SeqCst));
        assert!(manager.is_empty());
    }
}
