// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serve command: the process composition root.
//!
//! Loads the manifest, branches explicitly on the enable switch (build and
//! register the pool, or skip), and serves the status API until shutdown.
//! The server starts even when the datasource is absent — dependents are
//! expected to detect and report the absence themselves.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use aegis_datasource_core::application::{DatasourceGuard, PoolManager};
use aegis_datasource_core::domain::config::DatasourceManifest;
use aegis_datasource_core::domain::datasource::Datasource;
use aegis_datasource_core::infrastructure::PostgresPoolProvider;

pub async fn run(config_path: Option<PathBuf>, host: &str, port: u16) -> Result<()> {
    // Load configuration
    let manifest = DatasourceManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    // Compose: registry, provider, guard
    let manager = Arc::new(PoolManager::new());
    let guard = DatasourceGuard::new(
        Arc::new(PostgresPoolProvider::new()),
        Arc::clone(&manager),
    );

    let datasource = guard.build(&manifest.datasource).await;

    match &datasource {
        Datasource::Active(pool) => info!(pool = %pool.name(), "datasource active"),
        Datasource::Disabled => info!("datasource disabled by configuration"),
        Datasource::Absent => warn!(
            "datasource ABSENT after failed construction; features requiring it will be degraded"
        ),
    }

    let app_state = AppState {
        datasource,
        start_time: std::time::Instant::now(),
    };

    // Build HTTP router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/datasource", get(datasource_handler))
        .with_state(Arc::new(app_state));

    // Start HTTP server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Datasource service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Tear down registered pools before exit
    manager.shutdown_all().await;
    info!("Datasource service stopped");

    Ok(())
}

// Application state
struct AppState {
    datasource: Datasource,
    start_time: std::time::Instant,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn datasource_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match &state.datasource {
        Datasource::Active(pool) => {
            let stats = pool.stats();
            Json(json!({
                "state": "active",
                "pool": pool.name(),
                "connections": stats.connections,
                "idle": stats.idle,
            }))
        }
        other => Json(json!({ "state": other.state() })),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
