// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{not_nil, now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 最低分
pub const MIN_SCORE: i32 = 1;
/// 最高分
pub const MAX_SCORE: i32 = 5;

/// 评分实体
///
/// 表示某个用户对某个服务的打分。同一 (user_id, service_id) 至多一条，
/// 再次打分会覆盖原有分数而不是新增一行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Rating {
    /// 评分唯一标识符
    pub id: Uuid,
    /// 打分用户
    #[validate(custom(function = "not_nil"))]
    pub user_id: Uuid,
    /// 被评价的服务
    #[validate(custom(function = "not_nil"))]
    pub service_id: Uuid,
    /// 分数，取值 1~5
    #[validate(range(min = 1, max = 5, message = "score must be between 1 and 5"))]
    pub score: i32,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后修改时间
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    /// 创建新的评分
    ///
    /// # 参数
    ///
    /// * `user_id` - 打分用户，不能为 nil
    /// * `service_id` - 被评价的服务，不能为 nil
    /// * `score` - 分数，必须在 1~5 之间
    ///
    /// # 返回值
    ///
    /// * `Ok(Rating)` - 新生成 ID 的评分
    /// * `Err(ValidationError)` - 字段校验失败
    pub fn new(user_id: Uuid, service_id: Uuid, score: i32) -> Result<Self, ValidationError> {
        let ts = now();
        let rating = Self {
            id: Uuid::new_v4(),
            user_id,
            service_id,
            score,
            created_at: ts,
            updated_at: ts,
        };
        rating.validate()?;
        Ok(rating)
    }

    /// 修改分数并刷新更新时间；校验失败时实体保持不变
    pub fn update_score(&mut self, score: i32) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.score = score;
        next.validate()?;

        next.updated_at = now();
        *self = next;
        Ok(())
    }

    /// 是否属于给定的用户与服务
    pub fn is_owned_by(&self, user_id: Uuid, service_id: Uuid) -> bool {
        self.user_id == user_id && self.service_id == service_id
    }
}

/// 服务平均分
///
/// 由聚合查询即时计算，不落库。没有任何评分时平均分为 0，而不是 NaN 或空值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRating {
    pub service_id: Uuid,
    pub average_score: f64,
    pub total_ratings: i64,
}

impl AverageRating {
    /// 由 `AVG(score)` 与 `COUNT(*)` 的结果构造
    pub fn from_aggregate(service_id: Uuid, average: Option<f64>, total: i64) -> Self {
        let average_score = match average {
            Some(avg) if total > 0 && avg.is_finite() => avg,
            _ => 0.0,
        };

        Self {
            service_id,
            average_score,
            total_ratings: total.max(0),
        }
    }
}
