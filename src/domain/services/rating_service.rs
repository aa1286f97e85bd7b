// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ServiceSettings;
use crate::domain::models::comment::Comment;
use crate::domain::models::rating::{AverageRating, Rating};
use crate::domain::models::review::{Review, ReviewWithRating};
use crate::domain::models::user::User;
use crate::domain::pagination::{Page, PageParams};
use crate::domain::repositories::{
    CommentRepository, RatingRepository, Repository, RepositoryError, ReviewRepository,
    UserRepository,
};
use crate::utils::errors::ServiceError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 评分服务
///
/// 编排评分、评论与回复的业务规则，所有持久化都经由 `Repository` 端口完成。
/// 每个操作是一串顺序执行的仓库调用，不做重试，不持有跨请求的内存状态。
///
/// 每次仓库调用都受 `operation_timeout` 限制；调用方丢弃返回的 future
/// 即取消正在进行的调用，已经提交的写入不会回滚。
pub struct RatingService {
    repo: Arc<dyn Repository>,
    operation_timeout: Duration,
}

impl RatingService {
    /// 创建新的评分服务实例
    ///
    /// # 参数
    ///
    /// * `repo` - 存储端口
    /// * `settings` - 服务配置
    pub fn new(repo: Arc<dyn Repository>, settings: ServiceSettings) -> Self {
        Self {
            repo,
            operation_timeout: settings.operation_timeout(),
        }
    }

    /// 执行一次受时限约束的仓库调用，并按错误类别记录日志
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        let result = match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::Timeout(self.operation_timeout)),
        };

        result.map_err(|e| {
            match &e {
                RepositoryError::NotFound { .. } | RepositoryError::AlreadyExists(_) => {
                    warn!(
                        operation,
                        backend = self.repo.backend_name(),
                        error = %e,
                        "Repository rejected call"
                    );
                }
                _ => {
                    error!(
                        operation,
                        backend = self.repo.backend_name(),
                        error = %e,
                        "Repository call failed"
                    );
                }
            }
            ServiceError::from(e)
        })
    }

    /// 创建或覆盖评分
    ///
    /// 同一用户对同一服务再次打分时覆盖原分数，保留原 ID 与创建时间。
    /// 写入使用单条原子 upsert，并发的首次打分不会产生重复行。
    ///
    /// # 返回值
    ///
    /// * `Ok(Rating)` - 存储后的评分
    /// * `Err(ServiceError::Validation)` - 分数不在 1~5 之间
    #[instrument(skip(self), fields(user_id = %user_id, service_id = %service_id))]
    pub async fn create_rating(
        &self,
        user_id: Uuid,
        service_id: Uuid,
        score: i32,
    ) -> Result<Rating, ServiceError> {
        let rating = Rating::new(user_id, service_id, score).map_err(|e| {
            warn!(score, error = %e, "Rejected rating");
            e
        })?;

        let stored = self
            .call("upsert_rating", self.repo.upsert_rating(&rating))
            .await?;

        if stored.id == rating.id {
            info!(rating_id = %stored.id, score = stored.score, "Rating created");
        } else {
            info!(rating_id = %stored.id, score = stored.score, "Rating overwritten");
        }
        Ok(stored)
    }

    #[instrument(skip(self), fields(rating_id = %id))]
    pub async fn get_rating_by_id(&self, id: Uuid) -> Result<Rating, ServiceError> {
        self.call("find_rating_by_id", self.repo.find_rating_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("rating"))
    }

    #[instrument(skip(self), fields(user_id = %user_id, service_id = %service_id))]
    pub async fn get_rating_by_user_and_service(
        &self,
        user_id: Uuid,
        service_id: Uuid,
    ) -> Result<Rating, ServiceError> {
        self.call(
            "find_rating_by_user_and_service",
            self.repo.find_rating_by_user_and_service(user_id, service_id),
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("rating"))
    }

    #[instrument(
        skip(self, params),
        fields(service_id = %service_id, offset = params.offset())
    )]
    pub async fn list_ratings_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Rating>, ServiceError> {
        self.call(
            "list_ratings_by_service",
            self.repo.list_ratings_by_service(service_id, params),
        )
        .await
    }

    /// 修改已有评分的分数
    #[instrument(skip(self), fields(rating_id = %id))]
    pub async fn update_rating(&self, id: Uuid, score: i32) -> Result<Rating, ServiceError> {
        let mut rating = self.get_rating_by_id(id).await?;
        rating.update_score(score)?;

        let updated = self
            .call("update_rating", self.repo.update_rating(&rating))
            .await?;
        debug!(score = updated.score, "Rating updated");
        Ok(updated)
    }

    /// 服务的平均分，直接使用数据库聚合
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn get_average_rating(
        &self,
        service_id: Uuid,
    ) -> Result<AverageRating, ServiceError> {
        self.call("average_rating", self.repo.average_rating(service_id))
            .await
    }

    /// 创建评论
    ///
    /// 先读取评分：不存在返回 `NotFound`；评分的用户或服务与参数不一致返回
    /// `OwnershipMismatch`。两种情况都不会写入任何数据。
    /// 同一条评分已有评论时返回 `Conflict`。
    #[instrument(skip(self, title, content), fields(user_id = %user_id, rating_id = %rating_id))]
    pub async fn create_review(
        &self,
        user_id: Uuid,
        service_id: Uuid,
        rating_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<ReviewWithRating, ServiceError> {
        let rating = self.get_rating_by_id(rating_id).await?;
        if !rating.is_owned_by(user_id, service_id) {
            warn!(
                owner_id = %rating.user_id,
                owner_service_id = %rating.service_id,
                "Rating does not belong to review author"
            );
            return Err(ServiceError::OwnershipMismatch { rating_id });
        }

        let review = Review::new(user_id, service_id, rating_id, title, content)?;
        let stored = self
            .call("create_review", self.repo.create_review(&review))
            .await?;

        info!(review_id = %stored.id, "Review created");
        Ok(ReviewWithRating {
            review: stored,
            score: rating.score,
        })
    }

    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn get_review_by_id(&self, id: Uuid) -> Result<ReviewWithRating, ServiceError> {
        self.call("find_review_by_id", self.repo.find_review_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("review"))
    }

    #[instrument(
        skip(self, params),
        fields(service_id = %service_id, offset = params.offset())
    )]
    pub async fn list_reviews_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<ReviewWithRating>, ServiceError> {
        self.call(
            "list_reviews_by_service",
            self.repo.list_reviews_by_service(service_id, params),
        )
        .await
    }

    /// 修改评论标题与正文
    ///
    /// 不校验调用者是否为评论作者，身份校验由上游鉴权负责。
    #[instrument(skip(self, title, content), fields(review_id = %id))]
    pub async fn update_review(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<ReviewWithRating, ServiceError> {
        let existing = self.get_review_by_id(id).await?;
        let score = existing.score;

        let mut review = existing.into_review();
        review.update_content(title, content)?;

        let updated = self
            .call("update_review", self.repo.update_review(&review))
            .await?;
        debug!("Review updated");
        Ok(ReviewWithRating {
            review: updated,
            score,
        })
    }

    /// 创建回复
    ///
    /// 评论不存在时返回 `NotFound` 且不写入；任何用户都可以回复。
    #[instrument(skip(self, content), fields(user_id = %user_id, review_id = %review_id))]
    pub async fn create_comment(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        self.get_review_by_id(review_id).await?;

        let comment = Comment::new(user_id, review_id, content)?;
        let stored = self
            .call("create_comment", self.repo.create_comment(&comment))
            .await?;

        info!(comment_id = %stored.id, "Comment created");
        Ok(stored)
    }

    #[instrument(skip(self), fields(comment_id = %id))]
    pub async fn get_comment_by_id(&self, id: Uuid) -> Result<Comment, ServiceError> {
        self.call("find_comment_by_id", self.repo.find_comment_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("comment"))
    }

    #[instrument(
        skip(self, params),
        fields(review_id = %review_id, offset = params.offset())
    )]
    pub async fn list_comments_by_review(
        &self,
        review_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Comment>, ServiceError> {
        self.call(
            "list_comments_by_review",
            self.repo.list_comments_by_review(review_id, params),
        )
        .await
    }

    #[instrument(skip(self, content), fields(comment_id = %id))]
    pub async fn update_comment(&self, id: Uuid, content: &str) -> Result<Comment, ServiceError> {
        let mut comment = self.get_comment_by_id(id).await?;
        comment.update_content(content)?;

        let updated = self
            .call("update_comment", self.repo.update_comment(&comment))
            .await?;
        debug!("Comment updated");
        Ok(updated)
    }

    /// 注册用户
    ///
    /// 密码哈希由调用方计算。用户名或邮箱重复时返回 `Conflict`。
    #[instrument(skip(self, password_hash))]
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ServiceError> {
        let user = User::new(username, email, password_hash).map_err(|e| {
            warn!(field = %e.field, "Rejected user registration");
            e
        })?;

        let stored = self
            .call("create_user", self.repo.create_user(&user))
            .await?;
        info!(user_id = %stored.id, "User registered");
        Ok(stored)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<User, ServiceError> {
        self.call("find_user_by_id", self.repo.find_user_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.call("find_user_by_email", self.repo.find_user_by_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, ServiceError> {
        self.call(
            "find_user_by_username",
            self.repo.find_user_by_username(username),
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
    }

    /// 替换用户的密码哈希
    #[instrument(skip(self, password_hash), fields(user_id = %id))]
    pub async fn change_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<User, ServiceError> {
        let mut user = self.get_user_by_id(id).await?;
        user.update_password_hash(password_hash)?;

        self.call("update_user_password", self.repo.update_user_password(&user))
            .await
    }
}

#[cfg(test)]
#[path = "rating_service_test.rs"]
mod rating_service_test;
