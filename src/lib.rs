// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 组装配置、仓库与领域服务
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、分页契约、服务和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供 PostgreSQL 与 SQLite 的连接和仓库实现
pub mod infrastructure;

/// 工具模块
///
/// 提供服务层错误类型与日志初始化
pub mod utils;
