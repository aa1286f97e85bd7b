// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 用户实体
///
/// 由外部认证组件在注册时创建。密码哈希同样由外部计算，这里只负责保存；
/// 哈希永远不会被序列化输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    #[validate(
        custom(function = "not_blank"),
        length(max = 64, message = "username cannot exceed 64 characters")
    )]
    pub username: String,
    #[validate(
        email(message = "email is not a valid address"),
        length(max = 255, message = "email cannot exceed 255 characters")
    )]
    pub email: String,
    #[serde(skip_serializing, default)]
    #[validate(length(min = 1, message = "password hash cannot be empty"))]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 对外公开的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("username cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

impl User {
    /// 创建新用户
    ///
    /// # 参数
    ///
    /// * `username` - 用户名，去除空白后不能为空
    /// * `email` - 邮箱地址
    /// * `password_hash` - 已经计算好的密码哈希
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ts = now();
        let user = Self {
            id: Uuid::new_v4(),
            username: username.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password_hash: password_hash.into(),
            created_at: ts,
            updated_at: ts,
        };
        user.validate()?;
        Ok(user)
    }

    /// 替换密码哈希，这是用户唯一可变的字段
    pub fn update_password_hash(
        &mut self,
        password_hash: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(ValidationError::new(
                "password_hash",
                "password hash cannot be empty",
            ));
        }

        self.password_hash = password_hash;
        self.updated_at = now();
        Ok(())
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}
