//! `/videos` 查询串 → `QuerySpec` 的校验层。
//!
//! 引擎只接收已校验的规格；所有字段错误在这里一次性收集后以 400 返回。

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::core::parse_date;
use crate::error::ValidationError;
use crate::query::spec::{QuerySpec, SortOrder, DEFAULT_PAGE_SIZE};

/// 分页限制（配置项，不属于引擎不变量）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_page_size: NonZeroU32,
    pub max_page_size: Option<NonZeroU32>,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
        }
    }
}

/// 解析原始 key/value 对。
///
/// - `tags` / `tags[]` 可重复；空值被忽略。
/// - 其它参数重复出现时取最后一个；空字符串视为缺省。
/// - 未知参数忽略。
pub fn parse_video_query(
    pairs: &[(String, String)],
    limits: &PageLimits,
) -> Result<QuerySpec, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut spec = QuerySpec {
        page_size: limits.default_page_size,
        ..QuerySpec::default()
    };

    let last = |key: &str| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    };

    spec.tags = pairs
        .iter()
        .filter(|(k, v)| (k == "tags" || k == "tags[]") && !v.is_empty())
        .map(|(_, v)| v.clone())
        .collect();

    if let Some(search) = last("search") {
        spec.search_query = search.to_string();
    }

    if let Some(raw) = last("page") {
        match parse_positive(raw) {
            Some(page) => spec.page = page,
            None => errors.push(ValidationError::query(
                "page",
                raw,
                "Page must be an integer greater than or equal to 1",
            )),
        }
    }

    if let Some(raw) = last("pageSize") {
        match parse_positive(raw) {
            Some(size) => match limits.max_page_size {
                Some(max) if size > max => errors.push(ValidationError::query(
                    "pageSize",
                    raw,
                    format!("Page size must not exceed {max}"),
                )),
                _ => spec.page_size = size,
            },
            None => errors.push(ValidationError::query(
                "pageSize",
                raw,
                "Page size must be an integer greater than 0",
            )),
        }
    }

    if let Some(raw) = last("startDate") {
        match parse_date(raw) {
            Some(d) => spec.start_date = Some(d),
            None => errors.push(ValidationError::query(
                "startDate",
                raw,
                "Start date must be a valid ISO8601 date",
            )),
        }
    }

    if let Some(raw) = last("endDate") {
        match parse_date(raw) {
            Some(d) => spec.end_date = Some(d),
            None => errors.push(ValidationError::query(
                "endDate",
                raw,
                "End date must be a valid ISO8601 date",
            )),
        }
    }

    if let Some(raw) = last("sortBy") {
        match raw.parse::<SortOrder>() {
            Ok(order) => spec.sort_by = Some(order),
            Err(_) => errors.push(ValidationError::query("sortBy", raw, "Invalid sort order")),
        }
    }

    if errors.is_empty() {
        Ok(spec)
    } else {
        Err(errors)
    }
}

fn parse_positive(raw: &str) -> Option<NonZeroU32> {
    let s = raw.strip_prefix('+').unwrap_or(raw);
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<NonZeroU32>().ok()
}
