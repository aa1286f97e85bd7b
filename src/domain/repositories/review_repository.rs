// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::review::{Review, ReviewWithRating};
use crate::domain::pagination::{Page, PageParams};
use async_trait::async_trait;
use uuid::Uuid;

/// 评论仓库特质
///
/// 读取操作与评分联表，返回带分数的 `ReviewWithRating`。
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// 插入新评论
    ///
    /// 同一评分已有评论时返回 `AlreadyExists`，评分不存在时返回 `NotFound`。
    async fn create_review(&self, review: &Review) -> Result<Review, RepositoryError>;
    /// 根据ID查找评论
    async fn find_review_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ReviewWithRating>, RepositoryError>;
    /// 分页列出某服务的评论
    async fn list_reviews_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<ReviewWithRating>, RepositoryError>;
    /// 更新标题、正文与修改时间
    async fn update_review(&self, review: &Review) -> Result<Review, RepositoryError>;
}
