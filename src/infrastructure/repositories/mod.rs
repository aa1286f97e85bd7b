// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的两种数据库实现，二者行为一致，
/// 只在占位符、UUID/时间列表示与约束冲突信号上不同
pub mod postgres_repo_impl;
pub mod sqlite_repo_impl;

mod sql_support;

pub use postgres_repo_impl::PostgresRepository;
pub use sqlite_repo_impl::SqliteRepository;
