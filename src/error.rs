//! 错误类型：快照加载失败与查询参数校验失败。

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// 快照加载失败。
///
/// 由 `Catalog` 在本地吸收：索引回退为空，记录日志，不作为致命错误向上传播。
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("snapshot does not match the video schema: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        // 语法/EOF 错误 = 文档本身坏掉；Data 错误 = 结构合法但字段不符
        match err.classify() {
            serde_json::error::Category::Data => LoadError::Schema(err.to_string()),
            _ => LoadError::Malformed(err),
        }
    }
}

/// 单个查询参数的校验失败（字段级）。
///
/// 序列化形状与前端已有的 `{ type, value, msg, path, location }` 保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {msg}")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub msg: String,
    pub path: &'static str,
    pub location: &'static str,
}

impl ValidationError {
    pub fn query(path: &'static str, value: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            kind: "field",
            value: value.into(),
            msg: msg.into(),
            path,
            location: "query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_syntax_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        assert!(matches!(LoadError::from(err), LoadError::Malformed(_)));
    }

    #[test]
    fn json_type_mismatch_is_schema() {
        let err = serde_json::from_str::<Vec<u64>>("[\"x\"]").unwrap_err();
        assert!(matches!(LoadError::from(err), LoadError::Schema(_)));
    }

    #[test]
    fn validation_error_serializes_field_shape() {
        let e = ValidationError::query("page", "0", "Page must be an integer greater than or equal to 1");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "field");
        assert_eq!(v["path"], "page");
        assert_eq!(v["location"], "query");
        assert_eq!(v["value"], "0");
    }
}
