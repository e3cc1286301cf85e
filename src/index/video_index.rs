use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::core::{DocId, Video};
use crate::error::LoadError;
use crate::stats::CatalogStats;
use crate::storage::SnapshotDocument;

/// 只读视频索引：构建一次，之后不再修改。
///
/// ## 不变量
/// - `videos[doc]` 的 DocId 即加载顺序；`by_id` 与 `videos` 一一对应。
/// - 每个 tag 桶里的 DocId 都是 `videos` 的合法下标。
/// - `sorted_tags` 恰好是 `tag_buckets` 的键集合（字典序）。
///
/// 构建在局部完成，失败时整体丢弃，不存在“半个索引”。
#[derive(Debug, Default)]
pub struct VideoIndex {
    videos: Vec<Video>,
    by_id: HashMap<String, DocId>,
    tag_buckets: HashMap<String, RoaringBitmap>,
    sorted_tags: Vec<String>,
    duplicate_ids: usize,
}

impl VideoIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从快照字节构建
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let doc = SnapshotDocument::from_slice(bytes)?;
        Self::from_videos(doc.videos)
    }

    /// 从记录序列构建。
    ///
    /// 同 id 重复出现时，后者覆盖前者并沿用前者的位置。
    pub fn from_videos(records: Vec<Video>) -> Result<Self, LoadError> {
        let mut videos: Vec<Video> = Vec::with_capacity(records.len());
        let mut by_id: HashMap<String, DocId> = HashMap::with_capacity(records.len());
        let mut duplicate_ids = 0usize;

        for video in records {
            if let Some(&doc) = by_id.get(&video.id) {
                tracing::warn!("Duplicate video id {:?} in snapshot, keeping the later record", video.id);
                duplicate_ids += 1;
                videos[doc as usize] = video;
                continue;
            }
            let doc = DocId::try_from(videos.len())
                .map_err(|_| LoadError::Schema(format!("more than {} videos", DocId::MAX)))?;
            by_id.insert(video.id.clone(), doc);
            videos.push(video);
        }

        // 桶必须在去重之后构建：被覆盖记录的旧 tag 不能残留
        let mut tag_buckets: HashMap<String, RoaringBitmap> = HashMap::new();
        for (doc, video) in videos.iter().enumerate() {
            for tag in &video.tags {
                tag_buckets
                    .entry(tag.clone())
                    .or_default()
                    .insert(doc as DocId);
            }
        }

        let mut sorted_tags: Vec<String> = tag_buckets.keys().cloned().collect();
        sorted_tags.sort_unstable();

        Ok(Self {
            videos,
            by_id,
            tag_buckets,
            sorted_tags,
            duplicate_ids,
        })
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// 全部记录（加载顺序）
    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn get(&self, id: &str) -> Option<&Video> {
        self.by_id.get(id).and_then(|&doc| self.doc(doc))
    }

    pub fn doc(&self, doc: DocId) -> Option<&Video> {
        self.videos.get(doc as usize)
    }

    /// tag 桶（DocId 升序 = 加载顺序）；tag 不存在时为 None
    pub fn bucket(&self, tag: &str) -> Option<&RoaringBitmap> {
        self.tag_buckets.get(tag)
    }

    /// 携带 `tag` 的全部记录，id -> Video。未知 tag 返回空表。
    pub fn videos_by_tag(&self, tag: &str) -> HashMap<&str, &Video> {
        let Some(bucket) = self.bucket(tag) else {
            return HashMap::new();
        };
        bucket
            .iter()
            .filter_map(|doc| self.doc(doc))
            .map(|v| (v.id.as_str(), v))
            .collect()
    }

    /// 字典序去重后的全部 tag
    pub fn tags(&self) -> &[String] {
        &self.sorted_tags
    }

    pub fn stats(&self) -> CatalogStats {
        let estimated_bytes = self
            .videos
            .iter()
            .map(|v| {
                let tags: usize = v.tags.iter().map(String::len).sum();
                (v.id.len()
                    + v.title.len()
                    + v.thumbnail_url.len()
                    + v.created_at.as_str().len()
                    + tags) as u64
            })
            .sum();
        CatalogStats {
            video_count: self.videos.len(),
            tag_count: self.sorted_tags.len(),
            tag_postings_total: self.tag_buckets.values().map(RoaringBitmap::len).sum(),
            duplicate_ids: self.duplicate_ids,
            estimated_bytes,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::CreatedAt;

    pub(crate) fn mk_video(id: &str, title: &str, created_at: &str, tags: &[&str]) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            thumbnail_url: format!("https://cdn.example/{id}.jpg"),
            created_at: CreatedAt::parse(created_at).unwrap(),
            duration_secs: 60,
            views: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn assert_consistent(idx: &VideoIndex) {
        let mut keys: Vec<&String> = idx.tag_buckets.keys().collect();
        keys.sort();
        assert_eq!(keys, idx.sorted_tags.iter().collect::<Vec<_>>());
        for bucket in idx.tag_buckets.values() {
            for doc in bucket.iter() {
                let v = idx.doc(doc).expect("bucket doc must exist");
                assert_eq!(idx.get(&v.id), Some(v));
            }
        }
    }

    #[test]
    fn builds_buckets_and_sorted_tags() {
        let idx = VideoIndex::from_videos(vec![
            mk_video("1", "Rust basics", "2024-01-01", &["rust", "tutorial"]),
            mk_video("2", "Go basics", "2024-01-02", &["go", "tutorial"]),
            mk_video("3", "Cooking", "2024-01-03", &["food"]),
        ])
        .unwrap();

        assert_eq!(idx.len(), 3);
        assert_eq!(idx.tags(), ["food", "go", "rust", "tutorial"]);
        let tutorial: Vec<u32> = idx.bucket("tutorial").unwrap().iter().collect();
        assert_eq!(tutorial, vec![0, 1]);
        assert_consistent(&idx);
    }

    #[test]
    fn videos_by_tag_handles_unknown_tag() {
        let idx = VideoIndex::from_videos(vec![
            mk_video("a", "A", "2024-01-01", &["x"]),
            mk_video("b", "B", "2024-01-01", &["x", "y"]),
        ])
        .unwrap();

        let x = idx.videos_by_tag("x");
        assert_eq!(x.len(), 2);
        assert_eq!(x["b"].title, "B");
        assert!(idx.videos_by_tag("nope").is_empty());
    }

    #[test]
    fn duplicate_id_replaces_in_place_and_drops_stale_tags() {
        let idx = VideoIndex::from_videos(vec![
            mk_video("a", "Old", "2024-01-01", &["stale"]),
            mk_video("b", "B", "2024-01-01", &["keep"]),
            mk_video("a", "New", "2024-01-02", &["fresh"]),
        ])
        .unwrap();

        assert_eq!(idx.len(), 2);
        assert_eq!(idx.videos()[0].title, "New");
        assert!(idx.bucket("stale").is_none());
        assert_eq!(idx.tags(), ["fresh", "keep"]);
        assert_eq!(idx.stats().duplicate_ids, 1);
        assert_consistent(&idx);
    }

    #[test]
    fn repeated_tag_on_one_video_counts_once() {
        let idx =
            VideoIndex::from_videos(vec![mk_video("a", "A", "2024-01-01", &["x", "x"])]).unwrap();
        assert_eq!(idx.bucket("x").unwrap().len(), 1);
        assert_eq!(idx.stats().tag_postings_total, 1);
    }

    #[test]
    fn invalid_json_fails_without_partial_state() {
        assert!(VideoIndex::from_slice(b"{\"videos\": [").is_err());
        let empty = VideoIndex::empty();
        assert!(empty.is_empty());
        assert!(empty.tags().is_empty());
        assert_consistent(&empty);
    }

    #[test]
    fn minute_precision_timestamps_load() {
        let idx = VideoIndex::from_slice(
            br#"{"videos":[
                {"id":"a","title":"A","thumbnail_url":"u","created_at":"2024-01-05T10:00:00Z","duration":1,"views":0,"tags":["x"]},
                {"id":"b","title":"B","thumbnail_url":"u","created_at":"2024-01-05T10:00Z","duration":1,"views":0,"tags":["y"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(idx.len(), 2);
        let (a, b) = (idx.get("a").unwrap(), idx.get("b").unwrap());
        assert_eq!(a.created_at.millis(), b.created_at.millis());
        assert_eq!(b.created_at.as_str(), "2024-01-05T10:00Z");
        assert_consistent(&idx);
    }
}
