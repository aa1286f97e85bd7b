// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 领域服务只依赖这里的抽象契约，PostgreSQL 与 SQLite 的具体实现由基础设施层提供，
/// 两者行为完全一致。
///
/// 包含的仓库接口：
/// - 用户仓库（user_repository）：注册用户的持久化
/// - 评分仓库（rating_repository）：评分的增改查、原子 upsert 与平均分聚合
/// - 评论仓库（review_repository）：评论的增改查，读取时联表带出分数
/// - 回复仓库（comment_repository）：回复的增改查
pub mod comment_repository;
pub mod rating_repository;
pub mod review_repository;
pub mod user_repository;

pub use comment_repository::CommentRepository;
pub use rating_repository::RatingRepository;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;

use std::time::Duration;
use thiserror::Error;

/// 仓库错误类型
///
/// 各数据库方言的错误信号在实现层统一翻译到这里，领域层不感知具体厂商。
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 记录未找到（更新时没有匹配行，或外键指向的记录不存在）
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// 违反唯一约束
    #[error("{0}")]
    AlreadyExists(String),

    /// 库中数据无法还原为领域实体
    #[error("Corrupt {entity} row: {reason}")]
    Corrupt { entity: &'static str, reason: String },

    /// 调用超出时限
    #[error("Repository call timed out after {0:?}")]
    Timeout(Duration),

    /// 其他数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str) -> Self {
        RepositoryError::NotFound { entity }
    }

    pub fn corrupt(entity: &'static str, reason: impl ToString) -> Self {
        RepositoryError::Corrupt {
            entity,
            reason: reason.to_string(),
        }
    }
}

/// 完整的存储端口
///
/// 领域服务以 `Arc<dyn Repository>` 持有，每个后端实现四个实体仓库后再实现本 trait。
pub trait Repository:
    UserRepository + RatingRepository + ReviewRepository + CommentRepository
{
    /// 实现名称，仅用于日志
    fn backend_name(&self) -> &'static str;
}
