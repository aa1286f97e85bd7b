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

use crate::domain::pagination::{ListOrder, SortKey};
use crate::domain::repositories::RepositoryError;

/// 约束冲突类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

/// 插入失败时的翻译规则
///
/// 唯一约束冲突翻译为 `AlreadyExists`，外键冲突翻译为被引用实体的 `NotFound`，
/// 其余错误原样包装为 `Database`。
pub(crate) struct InsertFailure {
    pub conflict: &'static str,
    pub missing_parent: Option<&'static str>,
}

impl InsertFailure {
    pub(crate) fn translate(
        &self,
        err: sqlx::Error,
        violation: Option<Violation>,
    ) -> RepositoryError {
        match (violation, self.missing_parent) {
            (Some(Violation::Unique), _) => RepositoryError::AlreadyExists(self.conflict.into()),
            (Some(Violation::ForeignKey), Some(parent)) => RepositoryError::not_found(parent),
            _ => RepositoryError::Database(err),
        }
    }
}

/// 生成 ORDER BY 子句
///
/// 列名只能来自 `render` 对白名单枚举的映射，调用方传入的字符串不会进入 SQL。
/// 主键作为第二排序键，保证分页稳定。
pub(crate) fn order_by_clause(
    order: ListOrder,
    render: impl Fn(SortKey) -> String,
    tie_breaker: &str,
) -> String {
    format!(
        " ORDER BY {} {}, {} ASC",
        render(order.key),
        order.direction.as_sql(),
        tie_breaker
    )
}
