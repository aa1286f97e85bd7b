// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::comment::Comment;
use crate::domain::pagination::{Page, PageParams};
use async_trait::async_trait;
use uuid::Uuid;

/// 回复仓库特质
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// 插入新回复，评论不存在时返回 `NotFound`
    async fn create_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError>;
    async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepositoryError>;
    /// 分页列出某条评论下的回复，默认按创建时间正序
    async fn list_comments_by_review(
        &self,
        review_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Comment>, RepositoryError>;
    async fn update_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError>;
}
