// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{not_nil, now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 评论实体
///
/// 每条评论挂在一条评分之上（rating_id 唯一），且创建时该评分必须属于
/// 同一用户与同一服务。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Review {
    /// 评论唯一标识符
    pub id: Uuid,
    /// 作者
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
    /// 被评价的服务
    #[validate(custom(function = "not_nil"))]
    pub service_id: Uuid,
    /// 关联的评分
    #[validate(custom(function = "not_nil"))]
    pub rating_id: Uuid,
    /// 标题
    #[validate(length(
        min = 1,
        max = 255,
        message = "title must be between 1 and 255 characters"
    ))]
    pub title: String,
    /// 正文
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后修改时间
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// 创建新的评论
    ///
    /// 只做字段校验；评分是否存在、是否属于同一用户与服务由领域服务检查。
    pub fn new(
        user_id: Uuid,
        service_id: Uuid,
        rating_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ts = now();
        let review = Self {
            id: Uuid::new_v4(),
            user_id,
            service_id,
            rating_id,
            title: title.into(),
            content: content.into(),
            created_at: ts,
            updated_at: ts,
        };
        review.validate()?;
        Ok(review)
    }

    /// 修改标题与正文；校验失败时实体保持不变
    pub fn update_content(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.title = title.into();
        next.content = content.into();
        next.validate()?;

        next.updated_at = now();
        *self = next;
        Ok(())
    }
}

/// 带分数的评论
///
/// 只读组合视图，由评论与其评分联表查询得到，不单独持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWithRating {
    #[serde(flatten)]
    pub review: Review,
    /// 关联评分的分数
    pub score: i32,
}

impl ReviewWithRating {
    pub fn into_review(self) -> Review {
        self.review
    }
}

impl std::ops::Deref for ReviewWithRating {
    type Target = Review;

    fn deref(&self) -> &Self::Target {
        &self.review
    }
}
