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
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
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

/// SQLite 仓库实现
///
/// SQLite 没有原生的 UUID 与时间类型：UUID 以带连字符的小写文本保存，
/// 时间戳以固定微秒精度的 RFC 3339 文本（UTC，`Z` 结尾）保存，
/// 因此按文本排序即按时间排序。
/// 约束冲突依据扩展错误码判断（2067/1555 唯一约束，787 外键），
/// 拿不到错误码时退回到错误消息匹配。
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// 创建新的 SQLite 仓库实例
    ///
    /// 连接需要开启外键约束，sqlx 的 SQLite 连接默认开启。
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    match db_err.code().as_deref() {
        Some("2067") | Some("1555") => return Some(Violation::Unique),
        Some("787") => return Some(Violation::ForeignKey),
        _ => {}
    }

    let message = db_err.message();
    if message.contains("UNIQUE constraint failed") {
        Some(Violation::Unique)
    } else if message.contains("FOREIGN KEY constraint failed") {
        Some(Violation::ForeignKey)
    } else {
        None
    }
}

fn sort_column(alias: &str, key: SortKey) -> String {
    format!("{}.{}", alias, key.column())
}

fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_uuid(
    row: &SqliteRow,
    column: &str,
    entity: &'static str,
) -> Result<Uuid, RepositoryError> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| RepositoryError::corrupt(entity, format!("{}: {}", column, e)))
}

fn decode_timestamp(
    row: &SqliteRow,
    column: &str,
    entity: &'static str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RepositoryError::corrupt(entity, format!("{}: {}", column, e)))
}

fn rating_from_row(row: &SqliteRow) -> Result<Rating, RepositoryError> {
    Ok(Rating {
        id: decode_uuid(row, "id", "rating")?,
        user_id: decode_uuid(row, "user_id", "rating")?,
        service_id: decode_uuid(row, "service_id", "rating")?,
        score: row.try_get("score")?,
        created_at: decode_timestamp(row, "created_at", "rating")?,
        updated_at: decode_timestamp(row, "updated_at", "rating")?,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<ReviewWithRating, RepositoryError> {
    Ok(ReviewWithRating {
        review: Review {
            id: decode_uuid(row, "id", "review")?,
            user_id: decode_uuid(row, "user_id", "review")?,
            service_id: decode_uuid(row, "service_id", "review")?,
            rating_id: decode_uuid(row, "rating_id", "review")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: decode_timestamp(row, "created_at", "review")?,
            updated_at: decode_timestamp(row, "updated_at", "review")?,
        },
        score: row.try_get("score")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, RepositoryError> {
    Ok(Comment {
        id: decode_uuid(row, "id", "comment")?,
        user_id: decode_uuid(row, "user_id", "comment")?,
        review_id: decode_uuid(row, "review_id", "comment")?,
        content: row.try_get("content")?,
        created_at: decode_timestamp(row, "created_at", "comment")?,
        updated_at: decode_timestamp(row, "updated_at", "comment")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: decode_uuid(row, "id", "user")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: decode_timestamp(row, "created_at", "user")?,
        updated_at: decode_timestamp(row, "updated_at", "user")?,
    })
}

impl Repository for SqliteRepository {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        debug!(operation = "create_user", user_id = %user.id, "Executing insert");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(encode_timestamp(&user.created_at))
        .bind(encode_timestamp(&user.updated_at))
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

        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        debug!(operation = "find_user_by_email", "Querying single row");

        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        debug!(operation = "find_user_by_username", "Querying single row");

        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user_password(&self, user: &User) -> Result<User, RepositoryError> {
        debug!(operation = "update_user_password", user_id = %user.id, "Executing update");

        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(&user.password_hash)
            .bind(encode_timestamp(&user.updated_at))
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("user"));
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl RatingRepository for SqliteRepository {
    async fn create_rating(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        debug!(operation = "create_rating", rating_id = %rating.id, "Executing insert");

        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, service_id, score, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rating.id.to_string())
        .bind(rating.user_id.to_string())
        .bind(rating.service_id.to_string())
        .bind(rating.score)
        .bind(encode_timestamp(&rating.created_at))
        .bind(encode_timestamp(&rating.updated_at))
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
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, service_id)
            DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at
            RETURNING {}
            "#,
            RATING_COLUMNS
        ))
        .bind(rating.id.to_string())
        .bind(rating.user_id.to_string())
        .bind(rating.service_id.to_string())
        .bind(rating.score)
        .bind(encode_timestamp(&rating.created_at))
        .bind(encode_timestamp(&rating.updated_at))
        .fetch_one(&self.pool)
        .await?;

        rating_from_row(&row)
    }

    async fn find_rating_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError> {
        debug!(operation = "find_rating_by_id", rating_id = %id, "Querying single row");

        let row = sqlx::query(&format!("SELECT {} FROM ratings WHERE id = ?", RATING_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rating_from_row).transpose()
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
            "SELECT {} FROM ratings WHERE user_id = ? AND service_id = ?",
            RATING_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(service_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rating_from_row).transpose()
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

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE service_id = ?")
            .bind(service_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} FROM ratings rt WHERE rt.service_id = ?{} LIMIT ? OFFSET ?",
            RATING_COLUMNS,
            order_by_clause(order, |key| sort_column("rt", key), "rt.id")
        );
        let rows = sqlx::query(&query)
            .bind(service_id.to_string())
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

        let result = sqlx::query("UPDATE ratings SET score = ?, updated_at = ? WHERE id = ?")
            .bind(rating.score)
            .bind(encode_timestamp(&rating.updated_at))
            .bind(rating.id.to_string())
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
            SELECT CAST(AVG(score) AS REAL) AS average_score, COUNT(*) AS total_ratings
            FROM ratings
            WHERE service_id = ?
            "#,
        )
        .bind(service_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let average: Option<f64> = row.try_get("average_score")?;
        let total: i64 = row.try_get("total_ratings")?;
        Ok(AverageRating::from_aggregate(service_id, average, total))
    }
}

#[async_trait]
impl ReviewRepository for SqliteRepository {
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
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.service_id.to_string())
        .bind(review.rating_id.to_string())
        .bind(&review.title)
        .bind(&review.content)
        .bind(encode_timestamp(&review.created_at))
        .bind(encode_timestamp(&review.updated_at))
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

        let row = sqlx::query(&format!("{} WHERE r.id = ?", REVIEW_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(review_from_row).transpose()
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

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE service_id = ?")
            .bind(service_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "{} WHERE r.service_id = ?{} LIMIT ? OFFSET ?",
            REVIEW_SELECT,
            order_by_clause(
                order,
                |key| match key {
                    SortKey::Score => sort_column("rt", key),
                    _ => sort_column("r", key),
                },
                "r.id"
            )
        );
        let rows = sqlx::query(&query)
            .bind(service_id.to_string())
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

        let result =
            sqlx::query("UPDATE reviews SET title = ?, content = ?, updated_at = ? WHERE id = ?")
                .bind(&review.title)
                .bind(&review.content)
                .bind(encode_timestamp(&review.updated_at))
                .bind(review.id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("review"));
        }
        Ok(review.clone())
    }
}

#[async_trait]
impl CommentRepository for SqliteRepository {
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
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.id.to_string())
        .bind(comment.user_id.to_string())
        .bind(comment.review_id.to_string())
        .bind(&comment.content)
        .bind(encode_timestamp(&comment.created_at))
        .bind(encode_timestamp(&comment.updated_at))
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
            "SELECT {} FROM comments WHERE id = ?",
            COMMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
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

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?")
            .bind(review_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} FROM comments c WHERE c.review_id = ?{} LIMIT ? OFFSET ?",
            COMMENT_COLUMNS,
            order_by_clause(order, |key| sort_column("c", key), "c.id")
        );
        let rows = sqlx::query(&query)
            .bind(review_id.to_string())
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

        let result = sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
            .bind(&comment.content)
            .bind(encode_timestamp(&comment.updated_at))
            .bind(comment.id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("comment"));
        }
        Ok(comment.clone())
    }
}
