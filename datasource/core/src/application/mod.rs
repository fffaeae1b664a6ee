// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod guard;
pub mod pool_manager;

pub use guard::DatasourceGuard;
pub use pool_manager::PoolManager;
