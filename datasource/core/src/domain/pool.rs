// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pool Provider Trait - Anti-Corruption Layer for the pool library
//!
//! Abstracts the backing connection-pool implementation so the guard's logic
//! is testable against a fake provider without a real database, and so the
//! pool library can change without touching the domain.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::config::{DatasourceConfig, Secret};

/// Tuning handed to a [`PoolProvider`], derived from [`DatasourceConfig`].
///
/// Constructed only through [`PoolTuning::from_config`], which forces
/// checkout validation and fast failover on: a stale connection must never be
/// handed to a caller silently, and a failed backend node must be dropped
/// proactively rather than discovered by callers.
#[derive(Debug, Clone)]
pub struct PoolTuning {
    pub pool_name: String,
    pub connection_url: String,
    pub user_name: String,
    pub password: Secret,
    pub min_connections: u32,
    pub initial_connections: u32,
    pub max_connections: u32,
    /// Always true; see [`PoolTuning::from_config`].
    pub validate_on_checkout: bool,
    /// Always true; see [`PoolTuning::from_config`].
    pub fast_failover: bool,
    pub inactivity_timeout: Duration,
    pub time_to_live: Duration,
    pub connection_wait_timeout: Duration,
    pub abandoned_timeout: Duration,
    pub property_check_interval: Duration,
    pub notification_service_config: Option<String>,
}

impl PoolTuning {
    pub fn from_config(config: &DatasourceConfig) -> Self {
        Self {
            pool_name: config.pool_name.clone(),
            connection_url: config.connection_url.clone(),
            user_name: config.user_name.clone(),
            password: config.password.clone(),
            min_connections: config.min_connections,
            initial_connections: config.initial_connections,
            max_connections: config.max_connections,
            validate_on_checkout: true,
            fast_failover: true,
            inactivity_timeout: config.inactivity_timeout(),
            time_to_live: config.time_to_live(),
            connection_wait_timeout: config.connection_wait_timeout(),
            abandoned_timeout: config.abandoned_timeout(),
            property_check_interval: config.property_check_interval(),
            notification_service_config: config.notification_service().map(str::to_string),
        }
    }
}

/// Point-in-time pool counters, exposed on the status surface.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PoolStats {
    /// Open connections, checked out or idle.
    pub connections: u32,
    /// Idle connections ready for checkout.
    pub idle: u32,
}

/// Pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid datasource configuration: {0}")]
    Config(String),

    #[error("pool creation failed: {0}")]
    Creation(String),

    #[error("schema selection failed: {0}")]
    SchemaSelection(String),

    /// Checkout waited the full connection-wait timeout without a free slot.
    /// Callers decide whether to retry.
    #[error("no connection available after waiting {waited:?}")]
    Exhausted { waited: Duration },

    #[error("statement execution failed: {0}")]
    Statement(String),

    /// A connection failed checkout validation. Handled inside the pool by
    /// retrying with a fresh connection; callers never observe this.
    #[error("connection failed checkout validation")]
    Stale,
}

/// Creates pools from tuning. The single seam between the guard and the
/// backing pool library.
#[async_trait]
pub trait PoolProvider: Send + Sync {
    async fn create_pool(&self, tuning: &PoolTuning) -> Result<Arc<dyn ConnectionPool>, PoolError>;
}

/// A live, bounded connection pool.
///
/// Checkout/return are thread-safe; the implementation enforces
/// `max_connections` as a hard bound and times a checkout out after the
/// configured wait with [`PoolError::Exhausted`]. Idle and expired
/// connections are reclaimed by the implementation's own background process
/// without blocking checkouts.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Registry key.
    fn name(&self) -> &str;

    /// Check out a connection. The returned guard gives the connection back
    /// to the pool when dropped, so an explicit release call is not needed —
    /// and a cancelled (dropped) acquire future holds nothing.
    async fn acquire(&self) -> Result<Box<dyn PoolConnection>, PoolError>;

    fn stats(&self) -> PoolStats;

    /// Graceful teardown at process shutdown.
    async fn close(&self);
}

/// A checked-out connection.
#[async_trait]
pub trait PoolConnection: Send {
    /// Execute a single statement, returning the affected row count.
    async fn execute(&mut self, statement: &str) -> Result<u64, PoolError>;

    /// Session-scoped schema selection: set the default working schema for
    /// this connection's session. Used once per pool as an administrative
    /// action, not on the steady-state checkout path.
    async fn set_active_schema(&mut self, schema: &str) -> Result<(), PoolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DatasourceConfig;

    #[test]
    fn test_tuning_forces_checkout_validation_and_fast_failover() {
        let config = DatasourceConfig {
            enabled: true,
            connection_url: "postgres://db:5432/app".to_string(),
            user_name: "app".to_string(),
            password: "pw".into(),
            ..DatasourceConfig::default()
        };

        let tuning = PoolTuning::from_config(&config);
        assert!(tuning.validate_on_checkout);
        assert!(tuning.fast_failover);
        assert_eq!(tuning.pool_name, "cache");
        assert_eq!(tuning.connection_wait_timeout, Duration::from_secs(9));
        assert_eq!(tuning.notification_service_config, None);
    }

    #[test]
    fn test_tuning_carries_notification_service_only_when_set() {
        let mut config = DatasourceConfig::default();
        config.notification_service_config = "nodes=ons1:6200".to_string();
        let tuning = PoolTuning::from_config(&config);
        assert_eq!(tuning.notification_service_config.as_deref(), Some("nodes=ons1:6200"));
    }
}
