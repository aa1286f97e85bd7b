// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::sql_support::{order_by_clause, InsertFailure, Violation};
use crate::domain::models::comment::Comment;
use crate::domain::models::rating::{AverageRating, Rating};
use crate::domain::models::review::{Review, ReviewWithRating};
use crate::domain::models::user::User;
use crate::domain::pagination::{Page, PageParams, SortKey, SortTarget};
use crate::domain::repositories::{
    CommentRepository, RatingRepository, Repository, RepositoryError, ReviewRepository,
    UserRepository,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

const RATING_COLUMNS: &str = "id, user_id, service_id, score, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, user_id, review_id, content, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.service_id, r.rating_id, r.title, r.content,
           r.created_at, r.updated_at, rt.score
    FROM reviews r
    JOIN ratings rt ON rt.id = r.rating_id"#;

/// PostgreSQL 仓库实现
///
/// 占位符为 `$n`；UUID 与时间戳使用原生的 `uuid` / `timestamptz` 列；
/// 约束冲突依据 SQLSTATE 判断（23505 唯一约束，23503 外键）。
#[derive(Clone)]
pub struct PostgresRepository {
    /// 连接池
    pool: PgPool,
}

impl PostgresRepository {
    /// 创建新的 PostgreSQL 仓库实例
    ///
    /// # 参数
    ///
    /// * `pool` - 已经完成迁移的连接池
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 识别 PostgreSQL 的约束冲突
fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    match db_err.code().as_deref() {
        Some("23505") => Some(Violation::Unique),
        Some("23503") => Some(Violation::ForeignKey),
        _ => None,
    }
}

/// 排序列：带表别名并加双引号；文本列使用 "C" 排序规则，与 SQLite 的二进制比较一致
fn sort_column(alias: &str, key: SortKey) -> String {
    match key {
        SortKey::Title | SortKey::Content => {
            format!(r#""{}"."{}" COLLATE "C""#, alias, key.column())
        }
        _ => format!(r#""{}"."{}""#, alias, key.column()),
    }
}

fn rating_from_row(row: &PgRow) -> Result<Rating, sqlx::Error> {
    Ok(Rating {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        service_id: row.try_get("service_id")?,
        score: row.try_get("score")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<ReviewWithRating, sqlx::Error> {
    Ok(ReviewWithRating {
        review: Review {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            service_id: row.try_get("service_id")?,
            rating_id: row.try_get("rating_id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        score: row.try_get("score")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        review_id: row.try_get("review_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Repository for PostgresRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        debug!(operation = "create_user", user_id = %user.id, "Executing insert");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let kind = violation(&e);
            InsertFailure {
                conflict: "username or email already registered",
                missing_parent: None,
            }
            .translate(e, kind)
        })?;

        Ok(user.clone())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        debug!(operation = "find_user_by_id", user_id = %id, "Querying single row");

        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        debug!(operation = "find_user_by_email", "Querying single row");

        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        debug!(operation = "find_user_by_username", "Querying single row");

        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn update_user_password(&self, user: &User) -> Result<User, RepositoryError> {
        debug!(operation = "update_user_password", user_id = %user.id, "Executing update");

        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                .bind(&user.password_hash)
                .bind(user.updated_at)
                .bind(user.id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("user"));
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl RatingRepository for PostgresRepository {
    async fn create_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        debug!(operation = "create_rating", rating_id = %rating.id, "Executing insert");

        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, service_id, score, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(rating.id)
        .bind(rating.user_id)
        .bind(rating.service_id)
        .bind(rating.score)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let kind = violation(&e);
            InsertFailure {
                conflict: "rating already exists for this user and service",
                missing_parent: None,
            }
            .translate(e, kind)
        })?;

        Ok(rating.clone())
    }

    async fn upsert_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        debug!(
            operation = "upsert_rating",
            user_id = %rating.user_id,
            service_id = %rating.service_id,
            "Executing upsert"
        );

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ratings (id, user_id, service_id, score, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, service_id)
            DO UPDATE SET score = EXCLUDED.score, updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            RATING_COLUMNS
        ))
        .bind(rating.id)
        .bind(rating.user_id)
        .bind(rating.service_id)
        .bind(rating.score)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(rating_from_row(&row)?)
    }

    async fn find_rating_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError> {
        debug!(operation = "find_rating_by_id", rating_id = %id, "Querying single row");

        let row = sqlx::query(&format!(
            "SELECT {} FROM ratings WHERE id = $1",
            RATING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(rating_from_row).transpose()?)
    }

    async fn find_rating_by_user_and_service(
        &self,
        user_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError> {
        debug!(
            operation = "find_rating_by_user_and_service",
            user_id = %user_id,
            service_id = %service_id,
            "Querying single row"
        );

        let row = sqlx::query(&format!(
            "SELECT {} FROM ratings WHERE user_id = $1 AND service_id = $2",
            RATING_COLUMNS
        ))
        .bind(user_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(rating_from_row).transpose()?)
    }

    async fn list_ratings_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Rating>, RepositoryError> {
        let order = params.order_for(SortTarget::Ratings);
        debug!(
            operation = "list_ratings_by_service",
            service_id = %service_id,
            limit = params.limit(),
            offset = params.offset(),
            sort = order.key.column(),
            "Querying page"
        );

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} FROM ratings rt WHERE rt.service_id = $1{} LIMIT $2 OFFSET $3",
            RATING_COLUMNS,
            order_by_clause(order, |key| sort_column("rt", key), r#""rt"."id""#)
        );
        let rows = sqlx::query(&query)
            .bind(service_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(rating_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn update_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        debug!(operation = "update_rating", rating_id = %rating.id, "Executing update");

        let result = sqlx::query("UPDATE ratings SET score = $1, updated_at = $2 WHERE id = $3")
            .bind(rating.score)
            .bind(rating.updated_at)
            .bind(rating.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("rating"));
        }
        Ok(rating.clone())
    }

    async fn average_rating(&self, service_id: Uuid) -> Result<AverageRating, RepositoryError> {
        debug!(operation = "average_rating", service_id = %service_id, "Querying aggregate");

        let row = sqlx::query(
            r#"
            SELECT AVG(score)::float8 AS average_score, COUNT(*) AS total_ratings
            FROM ratings
            WHERE service_id = $1
            "#,
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await?;

        let average: Option<f64> = row.try_get("average_score")?;
        let total: i64 = row.try_get("total_ratings")?;
        Ok(AverageRating::from_aggregate(service_id, average, total))
    }
}

#[async_trait]
impl ReviewRepository for PostgresRepository {
    async fn create_review(&self, review: &Review) -> Result<Review, RepositoryError> {
        debug!(
            operation = "create_review",
            review_id = %review.id,
            rating_id = %review.rating_id,
            "Executing insert"
        );

        sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, service_id, rating_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.service_id)
        .bind(review.rating_id)
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let kind = violation(&e);
            InsertFailure {
                conflict: "review already exists for this rating",
                missing_parent: Some("rating"),
            }
            .translate(e, kind)
        })?;

        Ok(review.clone())
    }

    async fn find_review_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ReviewWithRating>, RepositoryError> {
        debug!(operation = "find_review_by_id", review_id = %id, "Querying single row");

        let row = sqlx::query(&format!("{} WHERE r.id = $1", REVIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(review_from_row).transpose()?)
    }

    async fn list_reviews_by_service(
        &self,
        service_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<ReviewWithRating>, RepositoryError> {
        let order = params.order_for(SortTarget::Reviews);
        debug!(
            operation = "list_reviews_by_service",
            service_id = %service_id,
            limit = params.limit(),
            offset = params.offset(),
            sort = order.key.column(),
            "Querying page"
        );

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "{} WHERE r.service_id = $1{} LIMIT $2 OFFSET $3",
            REVIEW_SELECT,
            order_by_clause(
                order,
                |key| match key {
                    SortKey::Score => sort_column("rt", key),
                    _ => sort_column("r", key),
                },
                r#""r"."id""#
            )
        );
        let rows = sqlx::query(&query)
            .bind(service_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(review_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn update_review(&self, review: &Review) -> Result<Review, RepositoryError> {
        debug!(operation = "update_review", review_id = %review.id, "Executing update");

        let result = sqlx::query(
            "UPDATE reviews SET title = $1, content = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.updated_at)
        .bind(review.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("review"));
        }
        Ok(review.clone())
    }
}

#[async_trait]
impl CommentRepository for PostgresRepository {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError> {
        debug!(
            operation = "create_comment",
            comment_id = %comment.id,
            review_id = %comment.review_id,
            "Executing insert"
        );

        sqlx::query(
            r#"
            INSERT INTO comments (id, user_id, review_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.user_id)
        .bind(comment.review_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let kind = violation(&e);
            InsertFailure {
                conflict: "comment already exists",
                missing_parent: Some("review"),
            }
            .translate(e, kind)
        })?;

        Ok(comment.clone())
    }

    async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepositoryError> {
        debug!(operation = "find_comment_by_id", comment_id = %id, "Querying single row");

        let row = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn list_comments_by_review(
        &self,
        review_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Comment>, RepositoryError> {
        let order = params.order_for(SortTarget::Comments);
        debug!(
            operation = "list_comments_by_review",
            review_id = %review_id,
            limit = params.limit(),
            offset = params.offset(),
            sort = order.key.column(),
            "Querying page"
        );

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} FROM comments c WHERE c.review_id = $1{} LIMIT $2 OFFSET $3",
            COMMENT_COLUMNS,
            order_by_clause(order, |key| sort_column("c", key), r#""c"."id""#)
        );
        let rows = sqlx::query(&query)
            .bind(review_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment, RepositoryError> {
        debug!(operation = "update_comment", comment_id = %comment.id, "Executing update");

        let result =
            sqlx::query("UPDATE comments SET content = $1, updated_at = $2 WHERE id = $3")
                .bind(&comment.content)
                .bind(comment.updated_at)
                .bind(comment.id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("comment"));
        }
        Ok(comment.clone())
    }
}
