// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::rating::{AverageRating, Rating};
use crate::domain::pagination::{Page, PageParams};
use async_trait::async_trait;
use uuid::Uuid;

/// 评分仓库特质
///
/// 定义评分数据访问接口。(user_id, service_id) 在存储层有唯一约束，
/// 违反时统一返回 `RepositoryError::AlreadyExists`。
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// 插入新评分
    ///
    /// # 参数
    ///
    /// * `rating` - 要保存的评分
    ///
    /// # 返回值
    ///
    /// * `Ok(Rating)` - 保存成功
    /// * `Err(RepositoryError::AlreadyExists)` - 该用户已对该服务打过分
    /// * `Err(RepositoryError)` - 其他存储错误
    async fn create_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError>;

    /// 原子地插入或覆盖评分
    ///
    /// 以 (user_id, service_id) 为冲突目标：不存在时插入 `rating`；
    /// 已存在时只覆盖 score 与 updated_at，保留原有的 id 与 created_at。
    ///
    /// # 返回值
    ///
    /// * `Ok(Rating)` - 落库后的评分
    /// * `Err(RepositoryError)` - 存储错误
    async fn upsert_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError>;

    /// 根据ID查找评分
    async fn find_rating_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError>;

    /// 查找某用户对某服务的评分
    async fn find_rating_by_user_and_service(
        &self,
        user_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError>;

    /// 分页列出某服务的评分
    ///
    /// 总数来自独立的计数查询。
    async fn list_ratings_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Rating>, RepositoryError>;

    /// 更新分数，没有匹配行时返回 `NotFound`
    async fn update_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError>;

    /// 计算某服务的平均分与评分总数
    async fn average_rating(&self, service_id: Uuid) -> Result<AverageRating, RepositoryError>;
}
