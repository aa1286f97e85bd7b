// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与关系型数据库的交互。
///
/// 包含的子模块：
/// - 数据库（database）：连接池、迁移与后端选择
/// - 仓库实现（repositories）：PostgreSQL 与 SQLite 两种仓库实现
///
/// 基础设施层遵循依赖倒置原则，依赖于领域层的抽象接口，
/// 确保领域层保持纯粹的业务逻辑，不受技术实现的影响。
pub mod database;
pub mod repositories;
