// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AEGIS Datasource Core
//!
//! Connection pool guard for processes that depend on an optional, bounded
//! database connection pool.
//!
//! # Architecture
//!
//! - **domain** — configuration, pool/provider traits, error kinds
//! - **application** — the guard itself and the pool registry
//! - **infrastructure** — the sqlx-backed Postgres provider

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
