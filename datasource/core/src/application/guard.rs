// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Connection Pool Guard
//
// Validates externally supplied pool configuration, builds a bounded pool
// through the injected provider, applies one-time session-level
// initialization (schema selection), and registers the result with the pool
// registry. Construction happens once, synchronously, at process startup.
//
// Failure policy: construction-time errors degrade to an absent datasource
// rather than crashing the process. The tradeoff is deliberate — deployments
// that consider the datasource critical-path can treat `Datasource::Absent`
// as fatal at the composition root.

use metrics::counter;
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::application::pool_manager::PoolManager;
use crate::domain::config::DatasourceConfig;
use crate::domain::datasource::Datasource;
use crate::domain::pool::{ConnectionPool, PoolError, PoolProvider, PoolTuning};

/// Builds the process datasource. One instance per process, used once.
pub struct DatasourceGuard {
    provider: Arc<dyn PoolProvider>,
    manager: Arc<PoolManager>,
}

impl DatasourceGuard {
    pub fn new(provider: Arc<dyn PoolProvider>, manager: Arc<PoolManager>) -> Self {
        Self { provider, manager }
    }

    /// Build the datasource described by `config`.
    ///
    /// Disabled config short-circuits to [`Datasource::Disabled`] without
    /// touching the provider or the network. Construction failures are logged
    /// with their full cause chain and converted to [`Datasource::Absent`];
    /// this method never fails the process.
    pub async fn build(&self, config: &DatasourceConfig) -> Datasource {
        if !config.enabled {
            info!("datasource disabled; process runs without a pool");
            return Datasource::Disabled;
        }

        info!(
            pool = %config.pool_name,
            url = %config.masked_url(),
            "building datasource pool"
        );

        match self.try_build(config).await {
            Ok(pool) => {
                info!(pool = %pool.name(), "datasource pool ready");
                counter!("datasource_builds_total", "outcome" => "active").increment(1);
                Datasource::Active(pool)
            }
            Err(err) => {
                error!(
                    pool = %config.pool_name,
                    cause = %cause_chain(&err),
                    "datasource pool construction failed; continuing without a datasource"
                );
                counter!("datasource_builds_total", "outcome" => "absent").increment(1);
                Datasource::Absent
            }
        }
    }

    async fn try_build(&self, config: &DatasourceConfig) -> Result<Arc<dyn ConnectionPool>, PoolError> {
        config.validate()?;

        // Tuning forces checkout validation and fast failover on
        let tuning = PoolTuning::from_config(config);
        let pool = self.provider.create_pool(&tuning).await?;

        if let Some(schema) = config.schema() {
            self.select_schema(pool.as_ref(), schema).await?;
        }

        self.manager.register(Arc::clone(&pool))?;
        Ok(pool)
    }

    /// One-time administrative action: check out a single connection, set its
    /// session's working schema, and give it back to the pool. Runs before
    /// registration so a failed selection never leaves a half-configured pool
    /// visible in the registry.
    async fn select_schema(&self, pool: &dyn ConnectionPool, schema: &str) -> Result<(), PoolError> {
        debug!(schema, "applying session-scoped schema selection");
        let mut conn = pool.acquire().await?;
        conn.set_active_schema(schema).await?;
        // conn drops here and returns to the pool
        Ok(())
    }
}

/// Render an error and its sources as a single line.
fn cause_chain(err: &PoolError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
