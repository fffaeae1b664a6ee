// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Pool Provider
//!
//! Implements [`PoolProvider`] over `sqlx::postgres::PgPool`. Tuning maps
//! onto the pool library as follows:
//!
//! | tuning                    | pool library                 |
//! |---------------------------|------------------------------|
//! | `min_connections`         | `min_connections`            |
//! | `max_connections`         | `max_connections`            |
//! | `connection_wait_timeout` | `acquire_timeout`            |
//! | `inactivity_timeout`      | `idle_timeout`               |
//! | `time_to_live`            | `max_lifetime`               |
//! | `validate_on_checkout`    | `test_before_acquire`        |
//! | `initial_connections > 0` | eager `connect` (first connection pinged) |
//!
//! `abandoned_timeout`, `property_check_interval`, and the
//! notification-service configuration have no sqlx equivalent; idle/lifetime
//! eviction is covered by sqlx's background reaper, and checkout validation
//! plus `fast_failover` eviction-on-ping stand in for push-based failover
//! notifications.

use async_trait::async_trait;
use metrics::counter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::pool::{
    ConnectionPool, PoolConnection, PoolError, PoolProvider, PoolStats, PoolTuning,
};

/// Stateless factory; all state lives in the pools it creates.
#[derive(Debug, Default)]
pub struct PostgresPoolProvider;

impl PostgresPoolProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PoolProvider for PostgresPoolProvider {
    async fn create_pool(&self, tuning: &PoolTuning) -> Result<Arc<dyn ConnectionPool>, PoolError> {
        let connect = tuning
            .connection_url
            .parse::<PgConnectOptions>()
            .map_err(|e| PoolError::Creation(format!("invalid connection URL: {e}")))?
            .username(&tuning.user_name)
            .password(tuning.password.expose());

        let options = PgPoolOptions::new()
            .min_connections(tuning.min_connections)
            .max_connections(tuning.max_connections)
            .acquire_timeout(tuning.connection_wait_timeout)
            .idle_timeout(Some(tuning.inactivity_timeout))
            .max_lifetime(Some(tuning.time_to_live))
            .test_before_acquire(tuning.validate_on_checkout);

        if let Some(ons) = tuning.notification_service_config.as_deref() {
            warn!(
                config = %ons,
                "notification-service configuration is not supported by the postgres backend; relying on checkout validation"
            );
        }
        debug!(
            abandoned_timeout = ?tuning.abandoned_timeout,
            property_check_interval = ?tuning.property_check_interval,
            "reclamation intervals are handled by the pool library's reaper"
        );

        let pool = if tuning.initial_connections > 0 {
            options
                .connect_with(connect)
                .await
                .map_err(|e| PoolError::Creation(e.to_string()))?
        } else {
            options.connect_lazy_with(connect)
        };

        Ok(Arc::new(PostgresPool {
            name: tuning.pool_name.clone(),
            wait: tuning.connection_wait_timeout,
            pool,
        }))
    }
}

struct PostgresPool {
    name: String,
    wait: Duration,
    pool: PgPool,
}

#[async_trait]
impl ConnectionPool for PostgresPool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(&self) -> Result<Box<dyn PoolConnection>, PoolError> {
        match self.pool.acquire().await {
            Ok(conn) => {
                counter!("datasource_pool_checkouts_total", "pool" => self.name.clone())
                    .increment(1);
                Ok(Box::new(PostgresConnection { conn }))
            }
            Err(sqlx::Error::PoolTimedOut) => {
                counter!("datasource_pool_checkout_timeouts_total", "pool" => self.name.clone())
                    .increment(1);
                Err(PoolError::Exhausted { waited: self.wait })
            }
            Err(e) => Err(PoolError::Creation(format!(
                "failed to establish connection: {e}"
            ))),
        }
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            connections: self.pool.size(),
            idle: self.pool.num_idle() as u32,
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

struct PostgresConnection {
    conn: sqlx::pool::PoolConnection<sqlx::Postgres>,
}

#[async_trait]
impl PoolConnection for PostgresConnection {
    async fn execute(&mut self, statement: &str) -> Result<u64, PoolError> {
        sqlx::query(statement)
            .execute(&mut *self.conn)
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| PoolError::Statement(e.to_string()))
    }

    async fn set_active_schema(&mut self, schema: &str) -> Result<(), PoolError> {
        let statement = format!("SET search_path TO {}", quote_ident(schema));
        sqlx::query(&statement)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| PoolError::SchemaSelection(e.to_string()))?;
        Ok(())
    }
}

/// Double-quote an identifier, escaping embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DatasourceConfig;

    fn tuning(initial: u32) -> PoolTuning {
        let config = DatasourceConfig {
            enabled: true,
            connection_url: "postgres://db.internal:5432/app".to_string(),
            user_name: "app".to_string(),
            password: "pw".into(),
            initial_connections: initial,
            ..DatasourceConfig::default()
        };
        PoolTuning::from_config(&config)
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("sales"), "\"sales\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_creation_error() {
        let provider = PostgresPoolProvider::new();
        let mut bad = tuning(0);
        bad.connection_url = "://not-a-url".to_string();

        let err = match provider.create_pool(&bad).await {
            Ok(_) => panic!("expected a creation error"),
            Err(e) => e,
        };
        assert!(matches!(err, PoolError::Creation(_)));
    }

    #[tokio::test]
    async fn test_lazy_pool_builds_without_network() {
        // initial_connections == 0 selects connect_lazy: no connection is
        // attempted until first checkout
        let provider = PostgresPoolProvider::new();
        let pool = provider.create_pool(&tuning(0)).await.unwrap();

        assert_eq!(pool.name(), "cache");
        assert_eq!(pool.stats().connections, 0);
        pool.close().await;
    }
}
