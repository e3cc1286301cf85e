use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::LoadError;
use crate::index::VideoIndex;
use crate::stats::CatalogStats;
use crate::storage::SnapshotStore;

/// 最近一次加载结果（供 /status 查询）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadOutcome {
    NotLoaded,
    Loaded { videos: usize },
    Failed { error: String },
}

/// 目录：当前已发布索引的唯一句柄。
///
/// 读路径：`current()` 取一次快照，整个查询都在这份索引上完成，无锁。
/// 写路径：先在局部完整构建新索引，再 `store` 原子切换；失败时发布空索引。
pub struct Catalog {
    current: ArcSwap<VideoIndex>,
    store: Option<SnapshotStore>,
    last_load: RwLock<LoadOutcome>,
}

impl Catalog {
    /// 直接注入一个已构建的索引（无快照来源，`reload` 为空操作）
    pub fn from_index(index: VideoIndex) -> Self {
        let outcome = LoadOutcome::Loaded {
            videos: index.len(),
        };
        Self {
            current: ArcSwap::from_pointee(index),
            store: None,
            last_load: RwLock::new(outcome),
        }
    }

    /// 以快照文件为来源的空目录；需调用 `reload` 才会有数据
    pub fn with_snapshot(path: PathBuf) -> Self {
        Self {
            current: ArcSwap::from_pointee(VideoIndex::empty()),
            store: Some(SnapshotStore::new(path)),
            last_load: RwLock::new(LoadOutcome::NotLoaded),
        }
    }

    /// 启动路径：创建并完成首次加载。加载失败不致命，目录以空索引继续服务。
    pub async fn open(path: PathBuf) -> Arc<Self> {
        let catalog = Self::with_snapshot(path);
        let _ = catalog.reload().await;
        Arc::new(catalog)
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.store.as_ref().map(SnapshotStore::path)
    }

    /// 当前索引（一次 load，查询期间保持不变）
    pub fn current(&self) -> Guard<Arc<VideoIndex>> {
        self.current.load()
    }

    pub fn last_load(&self) -> LoadOutcome {
        self.last_load.read().clone()
    }

    /// 从快照文件全量重建并发布
    pub async fn reload(&self) -> Result<CatalogStats, LoadError> {
        let Some(store) = self.store.as_ref() else {
            tracing::debug!("Catalog has no snapshot source, reload skipped");
            return Ok(self.current().stats());
        };
        let built = match store.load().await {
            Ok(doc) => VideoIndex::from_videos(doc.videos),
            Err(e) => Err(e),
        };
        self.publish(built)
    }

    /// 从内存中的快照字节全量重建并发布
    pub fn load_slice(&self, bytes: &[u8]) -> Result<CatalogStats, LoadError> {
        self.publish(VideoIndex::from_slice(bytes))
    }

    fn publish(&self, built: Result<VideoIndex, LoadError>) -> Result<CatalogStats, LoadError> {
        match built {
            Ok(index) => {
                let stats = index.stats();
                self.current.store(Arc::new(index));
                *self.last_load.write() = LoadOutcome::Loaded {
                    videos: stats.video_count,
                };
                tracing::info!(
                    "Loaded video snapshot: {} videos, {} tags\n{}",
                    stats.video_count,
                    stats.tag_count,
                    stats
                );
                Ok(stats)
            }
            Err(e) => {
                self.current.store(Arc::new(VideoIndex::empty()));
                *self.last_load.write() = LoadOutcome::Failed {
                    error: e.to_string(),
                };
                tracing::error!("Failed to load video snapshot: {}, serving empty catalog", e);
                Err(e)
            }
        }
    }

    /// SIGHUP 触发全量重载（build-then-publish）
    #[cfg(unix)]
    pub async fn reload_on_hangup(self: Arc<Self>) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Failed to install SIGHUP handler, reload disabled: {}", e);
                return;
            }
        };
        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received, reloading snapshot");
            let _ = self.reload().await;
        }
    }
}
