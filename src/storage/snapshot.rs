use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::core::Video;
use crate::error::LoadError;

/// 快照文档：`{ "videos": [...] }`
#[derive(Debug, Deserialize)]
pub struct SnapshotDocument {
    pub videos: Vec<Video>,
}

impl SnapshotDocument {
    /// 解码快照（结构与字段校验都在这一步完成）
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let doc: SnapshotDocument = serde_json::from_slice(bytes)?;
        for (i, v) in doc.videos.iter().enumerate() {
            if v.id.trim().is_empty() {
                return Err(LoadError::Schema(format!("videos[{i}]: empty id")));
            }
        }
        Ok(doc)
    }
}

/// 只读快照存储：静态 JSON 文件，无写回路径。
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取原始字节
    async fn read(&self) -> Result<Vec<u8>, LoadError> {
        fs::read(&self.path).await.map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// 读取并解码整个快照
    pub async fn load(&self) -> Result<SnapshotDocument, LoadError> {
        let data = self.read().await?;
        let doc = SnapshotDocument::from_slice(&data)?;
        tracing::debug!(
            "Snapshot decoded: {} videos from {:?} ({} bytes)",
            doc.videos.len(),
            self.path,
            data.len()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_tmp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("vidcat-snapshot-{}-{}", tag, nanos))
    }

    #[tokio::test]
    async fn load_reads_videos_from_disk() {
        let dir = unique_tmp_dir("ok");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("videos.json");
        std::fs::write(
            &path,
            br#"{"videos":[{"id":"a","title":"A","thumbnail_url":"u","created_at":"2024-02-01T00:00:00Z","duration":3,"views":4,"tags":["x"]}]}"#,
        )
        .unwrap();

        let doc = SnapshotStore::new(path).load().await.unwrap();
        assert_eq!(doc.videos.len(), 1);
        assert_eq!(doc.videos[0].id, "a");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let path = unique_tmp_dir("missing").join("videos.json");
        let err = SnapshotStore::new(path.clone()).load().await.unwrap_err();
        match err {
            LoadError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_videos_key_is_schema_error() {
        let err = SnapshotDocument::from_slice(br#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, LoadError::Schema(_)));
    }

    #[test]
    fn empty_id_is_schema_error() {
        let err = SnapshotDocument::from_slice(
            br#"{"videos":[{"id":" ","title":"A","thumbnail_url":"u","created_at":"2024-02-01","duration":3,"views":4,"tags":[]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Schema(msg) if msg.contains("videos[0]")));
    }

    #[test]
    fn truncated_document_is_malformed() {
        let err = SnapshotDocument::from_slice(br#"{"videos":[{"id":"a""#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }
}
