// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了跨实体的
/// 业务规则，协调多个仓库调用来完成一次业务操作。
///
/// 包含的服务：
/// - 评分服务（rating_service）：评分 upsert、评论归属校验、回复与用户注册
pub mod rating_service;

pub use rating_service::RatingService;
