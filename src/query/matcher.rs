use chrono::NaiveDate;

use crate::core::{end_of_day_millis, start_of_day_millis, Video};

/// 记录级过滤谓词
pub trait VideoMatcher: Send + Sync {
    fn matches(&self, video: &Video) -> bool;
}

/// 日期区间（两端按日边界包含）
pub struct DateRangeMatcher {
    start_millis: Option<i64>,
    end_millis: Option<i64>,
}

impl DateRangeMatcher {
    /// 两端都缺省时返回 None（不做约束）
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self {
            start_millis: start.map(start_of_day_millis),
            end_millis: end.map(end_of_day_millis),
        })
    }
}

impl VideoMatcher for DateRangeMatcher {
    fn matches(&self, video: &Video) -> bool {
        let t = video.created_at.millis();
        if self.start_millis.is_some_and(|s| t < s) {
            return false;
        }
        if self.end_millis.is_some_and(|e| t > e) {
            return false;
        }
        true
    }
}

/// 标题子串匹配（大小写不敏感）
pub struct TitleMatcher {
    needle: String,
}

impl TitleMatcher {
    /// 空查询返回 None（不做约束，而不是“全不匹配”）
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }
}

impl VideoMatcher for TitleMatcher {
    fn matches(&self, video: &Video) -> bool {
        video.title.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::video_index::tests::mk_video;

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn no_bounds_no_matcher() {
        assert!(DateRangeMatcher::new(None, None).is_none());
        assert!(TitleMatcher::new("").is_none());
    }

    #[test]
    fn end_date_includes_last_second_of_day() {
        let m = DateRangeMatcher::new(None, day(2024, 1, 5)).unwrap();
        assert!(m.matches(&mk_video("a", "A", "2024-01-05T23:59:59", &[])));
        assert!(m.matches(&mk_video("b", "B", "2024-01-05T23:59:59.999Z", &[])));
        assert!(!m.matches(&mk_video("c", "C", "2024-01-06T00:00:00Z", &[])));
    }

    #[test]
    fn start_date_includes_midnight() {
        let m = DateRangeMatcher::new(day(2024, 1, 5), None).unwrap();
        assert!(m.matches(&mk_video("a", "A", "2024-01-05T00:00:00Z", &[])));
        assert!(!m.matches(&mk_video("b", "B", "2024-01-04T23:59:59.999Z", &[])));
    }

    #[test]
    fn title_match_ignores_case() {
        let v = mk_video("a", "Intro to Go", "2024-01-01", &[]);
        assert!(TitleMatcher::new("go").unwrap().matches(&v));
        assert!(TitleMatcher::new("GO").unwrap().matches(&v));
        assert!(TitleMatcher::new("o t").unwrap().matches(&v));
        assert!(!TitleMatcher::new("rust").unwrap().matches(&v));
    }
}
