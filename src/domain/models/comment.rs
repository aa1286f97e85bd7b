// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{not_nil, now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 回复实体
///
/// 针对某条评论的讨论。任何用户都可以回复，只要求评论存在。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Comment {
    pub id: Uuid,
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
    #[validate(custom(function = "not_nil"))]
    pub review_id: Uuid,
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// 创建新的回复
    pub fn new(
        user_id: Uuid,
        review_id: Uuid,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ts = now();
        let comment = Self {
            id: Uuid::new_v4(),
            user_id,
            review_id,
            content: content.into(),
            created_at: ts,
            updated_at: ts,
        };
        comment.validate()?;
        Ok(comment)
    }

    /// 修改回复内容
    pub fn update_content(&mut self, content: impl Into<String>) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.content = content.into();
        next.validate()?;

        next.updated_at = now();
        *self = next;
        Ok(())
    }
}
