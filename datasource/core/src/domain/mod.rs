// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod config;
pub mod datasource;
pub mod pool;

pub use config::{DatasourceConfig, DatasourceManifest, Secret};
pub use datasource::Datasource;
pub use pool::{ConnectionPool, PoolConnection, PoolError, PoolProvider, PoolStats, PoolTuning};
