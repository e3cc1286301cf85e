use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 排序方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    DateAsc,
    DateDesc,
    AlphaAsc,
    AlphaDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::DateAsc,
        SortOrder::DateDesc,
        SortOrder::AlphaAsc,
        SortOrder::AlphaDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::DateAsc => "date-asc",
            SortOrder::DateDesc => "date-desc",
            SortOrder::AlphaAsc => "alpha-asc",
            SortOrder::AlphaDesc => "alpha-desc",
        }
    }

    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::DateDesc | SortOrder::AlphaDesc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOrder;

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or(UnknownSortOrder)
    }
}

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// 已校验的查询规格。
///
/// `page` / `page_size` 用 `NonZeroU32`，零值在类型层面无法表达。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySpec {
    pub tags: Vec<String>,
    pub search_query: String,
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<SortOrder>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            search_query: String::new(),
            page: NonZeroU32::MIN,
            page_size: DEFAULT_PAGE_SIZE,
            start_date: None,
            end_date: None,
            sort_by: None,
        }
    }
}

impl QuerySpec {
    /// 回显实际生效的过滤条件
    pub fn applied_filters(&self) -> AppliedFilters {
        AppliedFilters {
            tags: self.tags.clone(),
            search_query: self.search_query.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            sort_by: self.sort_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub tags: Vec<String>,
    pub search_query: String,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "ser_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
}

fn ser_date<S: serde::Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
        None => s.serialize_none(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: usize,
    pub total_videos: usize,
    pub applied_filters: AppliedFilters,
}
