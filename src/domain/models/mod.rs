// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了评分系统的核心业务实体，包括：
/// - 用户（user）：评分、评论与回复的发起者
/// - 评分（rating）：用户对某个服务的 1~5 分打分
/// - 评论（review）：挂在一条评分之上的文字评价
/// - 回复（comment）：针对某条评论的讨论
///
/// 构造函数负责字段级校验，跨实体规则由领域服务负责。
pub mod comment;
pub mod rating;
pub mod review;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use uuid::Uuid;

/// 字段校验错误
///
/// 由实体构造函数和修改方法返回，调用方可以直接修正输入，不应重试。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// 未通过校验的字段名
    pub field: String,
    /// 面向调用方的错误描述
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    /// 只保留按字段名排序后的第一个错误，保证同一输入总得到同一条消息
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        fields
            .into_iter()
            .find_map(|(field, errs)| {
                errs.first().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", field, err.code));
                    ValidationError::new(field.to_string(), message)
                })
            })
            .unwrap_or_else(|| ValidationError::new("unknown", "validation failed"))
    }
}

/// 拒绝 nil UUID，供 `#[validate(custom)]` 使用
pub(crate) fn not_nil(id: &Uuid) -> Result<(), validator::ValidationError> {
    if id.is_nil() {
        let mut err = validator::ValidationError::new("nil_uuid");
        err.message = Some("identifier cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

/// 当前 UTC 时间，截断到微秒
///
/// 两种数据库都只保存到微秒，截断后写入与读回的实体可以直接比较。
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
