// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Datasource handle
//!
//! The guard's terminal states. `Disabled` and `Absent` are both valid
//! outcomes: dependents hold this handle and must tolerate running without a
//! pool.

use std::fmt;
use std::sync::Arc;

use super::pool::ConnectionPool;

/// Outcome of datasource construction.
///
/// - `Disabled` — construction was never attempted (config switch off)
/// - `Active` — the pool is live and registered
/// - `Absent` — construction was attempted and failed; the process degrades
///   to running without a datasource
#[derive(Clone)]
pub enum Datasource {
    Disabled,
    Active(Arc<dyn ConnectionPool>),
    Absent,
}

impl Datasource {
    /// The live pool, when there is one. Callers must not assume a pool
    /// exists; `None` is a normal state of the process.
    pub fn pool(&self) -> Option<&Arc<dyn ConnectionPool>> {
        match self {
            Datasource::Active(pool) => Some(pool),
            Datasource::Disabled | Datasource::Absent => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Datasource::Active(_))
    }

    pub fn state(&self) -> &'static str {
        match self {
            Datasource::Disabled => "disabled",
            Datasource::Active(_) => "active",
            Datasource::Absent => "absent",
        }
    }
}

impl fmt::Debug for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datasource::Active(pool) => f.debug_tuple("Active").field(&pool.name()).finish(),
            Datasource::Disabled => f.write_str("Disabled"),
            Datasource::Absent => f.write_str("Absent"),
        }
    }
}
