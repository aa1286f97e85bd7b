// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ValidationError;
use crate::domain::repositories::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

/// 服务层错误类别
///
/// 调用方（例如 HTTP 适配层）据此映射状态码，不需要解析错误消息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    OwnershipMismatch,
    Conflict,
    Storage,
}

/// 服务层错误类型
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// 评论引用的评分不属于该用户或该服务
    #[error("Rating {rating_id} does not belong to this user and service")]
    OwnershipMismatch { rating_id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(RepositoryError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        ServiceError::NotFound { entity }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::OwnershipMismatch { .. } => ErrorKind::OwnershipMismatch,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity } => ServiceError::NotFound { entity },
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Storage(other),
        }
    }
}
