use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use roaring::RoaringBitmap;
use serde::Serialize;

use crate::core::Video;
use crate::index::{Catalog, VideoIndex};
use crate::query::collate::TitleKey;
use crate::query::matcher::{DateRangeMatcher, TitleMatcher, VideoMatcher};
use crate::query::spec::{PageMetadata, QuerySpec, SortOrder};

/// 一页结果 + 描述完整结果集的元数据
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub videos: Vec<Video>,
    pub metadata: PageMetadata,
}

/// 查询引擎：持有目录的只读引用（显式注入）。
pub struct QueryEngine {
    catalog: Arc<Catalog>,
}

impl QueryEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// 在当前发布的索引上执行一次查询；整个流水线只看同一份索引
    pub fn query(&self, spec: &QuerySpec) -> QueryResult {
        let index = self.catalog.current();
        execute(&index, spec)
    }

    pub fn tags(&self) -> Vec<String> {
        self.catalog.current().tags().to_vec()
    }
}

/// 固定顺序的流水线：tag → 日期 → 标题搜索 → 排序 → 分页
pub fn execute(index: &VideoIndex, spec: &QuerySpec) -> QueryResult {
    let candidates = filter_by_tags(index, &spec.tags);
    let candidates = filter_by_date(candidates, spec.start_date, spec.end_date);
    let candidates = filter_by_search(candidates, &spec.search_query);
    let candidates = match spec.sort_by {
        Some(order) => sort_videos(candidates, order),
        None => candidates,
    };
    paginate(candidates, spec)
}

/// AND 语义：从第一个 tag 的桶开始逐个求交。无 tag 时返回全部（加载顺序）。
pub fn filter_by_tags<'a>(index: &'a VideoIndex, tags: &[String]) -> Vec<&'a Video> {
    let Some((first, rest)) = tags.split_first() else {
        return index.videos().iter().collect();
    };

    let Some(first) = index.bucket(first) else {
        return Vec::new();
    };
    let mut acc: RoaringBitmap = first.clone();
    for tag in rest {
        let Some(bucket) = index.bucket(tag) else {
            return Vec::new();
        };
        acc &= bucket;
        if acc.is_empty() {
            break;
        }
    }

    acc.iter().filter_map(|doc| index.doc(doc)).collect()
}

pub fn filter_by_date(
    videos: Vec<&Video>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<&Video> {
    match DateRangeMatcher::new(start, end) {
        Some(m) => retain_matching(videos, &m),
        None => videos,
    }
}

pub fn filter_by_search<'a>(videos: Vec<&'a Video>, query: &str) -> Vec<&'a Video> {
    match TitleMatcher::new(query) {
        Some(m) => retain_matching(videos, &m),
        None => videos,
    }
}

fn retain_matching<'a>(mut videos: Vec<&'a Video>, matcher: &dyn VideoMatcher) -> Vec<&'a Video> {
    videos.retain(|v| matcher.matches(v));
    videos
}

/// 全序排序；主键相等时按 id 升序（与方向无关）
pub fn sort_videos(videos: Vec<&Video>, order: SortOrder) -> Vec<&Video> {
    let directed = |ord: Ordering| {
        if order.is_descending() {
            ord.reverse()
        } else {
            ord
        }
    };

    match order {
        SortOrder::DateAsc | SortOrder::DateDesc => {
            let mut videos = videos;
            videos.sort_by(|a, b| {
                directed(a.created_at.millis().cmp(&b.created_at.millis()))
                    .then_with(|| a.id.cmp(&b.id))
            });
            videos
        }
        SortOrder::AlphaAsc | SortOrder::AlphaDesc => {
            let mut keyed: Vec<(TitleKey, &Video)> =
                videos.into_iter().map(|v| (TitleKey::new(&v.title), v)).collect();
            keyed.sort_by(|(ka, a), (kb, b)| {
                directed(ka.cmp(kb).then_with(|| a.title.cmp(&b.title)))
                    .then_with(|| a.id.cmp(&b.id))
            });
            keyed.into_iter().map(|(_, v)| v).collect()
        }
    }
}

/// 超出范围的页返回空切片，不是错误
pub fn paginate(videos: Vec<&Video>, spec: &QuerySpec) -> QueryResult {
    let page_size = spec.page_size.get() as usize;
    let total_videos = videos.len();
    let total_pages = total_videos.div_ceil(page_size);
    let start = (spec.page.get() as usize - 1).saturating_mul(page_size);

    let page: Vec<Video> = videos
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    QueryResult {
        videos: page,
        metadata: PageMetadata {
            current_page: spec.page.get(),
            page_size: spec.page_size.get(),
            total_pages,
            total_videos,
            applied_filters: spec.applied_filters(),
        },
    }
}
