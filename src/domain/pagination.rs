// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认每页条数
pub const DEFAULT_LIMIT: i64 = 10;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// 解析排序方向，只接受小写的 "asc" / "desc"，其余一律回落为 `Desc`
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    /// SQL 关键字
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// 分页与排序参数
///
/// 所有列表操作共用。构造时完成归一化：
/// - `limit <= 0` 时取默认值 10
/// - `offset < 0` 时取 0
/// - 排序方向不是 "asc" / "desc" 时取 "desc"
///
/// 按页构造与按偏移构造保存的都是偏移量，页码由偏移量推导，
/// 因此等价的页码与偏移量得到相等的值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    limit: i64,
    offset: i64,
    sort_by: Option<String>,
    sort_direction: SortDirection,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: None,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl PageParams {
    /// 按偏移量构造
    ///
    /// # 参数
    ///
    /// * `limit` - 每页条数
    /// * `offset` - 从 0 开始的起始位置
    /// * `sort_by` - 排序字段，空字符串表示不指定
    /// * `sort_direction` - "asc" 或 "desc"
    pub fn with_offset(
        limit: i64,
        offset: i64,
        sort_by: impl Into<String>,
        sort_direction: &str,
    ) -> Self {
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        let offset = offset.max(0);
        let sort_by = sort_by.into();

        Self {
            limit,
            offset,
            sort_by: (!sort_by.is_empty()).then_some(sort_by),
            sort_direction: SortDirection::parse(sort_direction),
        }
    }

    /// 按页码构造，页码从 1 开始，`page <= 0` 视为第 1 页
    pub fn with_page(
        page: i64,
        limit: i64,
        sort_by: impl Into<String>,
        sort_direction: &str,
    ) -> Self {
        let page = if page <= 0 { 1 } else { page };
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        let offset = (page - 1).saturating_mul(limit);

        Self::with_offset(limit, offset, sort_by, sort_direction)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// 当前偏移量所在的页码（从 1 开始）
    pub fn page(&self) -> i64 {
        self.offset / self.limit + 1
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// 解析出某个列表目标的最终排序
    ///
    /// 未指定排序字段时使用目标的默认排序；指定了字段则先转小写再查白名单，
    /// 不在白名单里的字段一律替换为 `created_at`，方向取参数中的方向。
    pub fn order_for(&self, target: SortTarget) -> ListOrder {
        match self.sort_by.as_deref() {
            None => target.default_order(),
            Some(field) => ListOrder {
                key: target.resolve(field),
                direction: self.sort_direction,
            },
        }
    }
}

/// 可排序的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Score,
    CreatedAt,
    UpdatedAt,
    Title,
    Content,
}

impl SortKey {
    /// 列名
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::Title => "title",
            SortKey::Content => "content",
        }
    }
}

/// 列表查询的目标，每个目标有自己的排序白名单和默认排序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget {
    Ratings,
    Reviews,
    Comments,
}

const RATING_SORT_KEYS: &[SortKey] = &[SortKey::Score, SortKey::CreatedAt, SortKey::UpdatedAt];

const REVIEW_SORT_KEYS: &[SortKey] = &[
    SortKey::Score,
    SortKey::CreatedAt,
    SortKey::UpdatedAt,
    SortKey::Title,
    SortKey::Content,
];

const COMMENT_SORT_KEYS: &[SortKey] = &[SortKey::CreatedAt, SortKey::UpdatedAt, SortKey::Content];

impl SortTarget {
    /// 排序字段白名单
    pub fn allowed_keys(&self) -> &'static [SortKey] {
        match self {
            SortTarget::Ratings => RATING_SORT_KEYS,
            SortTarget::Reviews => REVIEW_SORT_KEYS,
            SortTarget::Comments => COMMENT_SORT_KEYS,
        }
    }

    /// 评分和评论按创建时间倒序，回复按对话顺序正序
    pub fn default_order(&self) -> ListOrder {
        let direction = match self {
            SortTarget::Ratings | SortTarget::Reviews => SortDirection::Desc,
            SortTarget::Comments => SortDirection::Asc,
        };

        ListOrder {
            key: SortKey::CreatedAt,
            direction,
        }
    }

    fn resolve(&self, field: &str) -> SortKey {
        let field = field.to_lowercase();
        self.allowed_keys()
            .iter()
            .copied()
            .find(|key| key.column() == field)
            .unwrap_or(SortKey::CreatedAt)
    }
}

/// 归一化之后的排序：白名单内的列 + 方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// 一页结果
///
/// `total` 来自独立的计数查询，与本页数据不在同一个事务中，
/// 并发写入时二者可能略有出入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }
}
