use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::core::time::parse_timestamp_millis;

/// 索引内部的稠密文档号（= 加载顺序）
pub type DocId = u32;

/// 创建时间：保留原始 ISO8601 文本（响应里原样回显），同时缓存 UTC 毫秒用于过滤与排序。
#[derive(Clone, PartialEq, Eq)]
pub struct CreatedAt {
    raw: String,
    millis: i64,
}

impl CreatedAt {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_timestamp_millis(raw).map(|millis| Self {
            raw: raw.to_string(),
            millis,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }
}

impl fmt::Debug for CreatedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.raw)
    }
}

impl Serialize for CreatedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for CreatedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CreatedAt::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO8601 timestamp: {raw:?}")))
    }
}

/// 视频元数据记录，加载后不可变。
///
/// 字段名与快照 / API 的 JSON 形状一致（`thumbnail_url`、`created_at`、`duration`）。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub created_at: CreatedAt,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub views: u64,
    pub tags: Vec<String>,
}
