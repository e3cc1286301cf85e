use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 无时区的 ISO8601 日期时间格式（按 UTC 解释）
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 带偏移的格式；`Z` 先被改写成 `+00:00`
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn zulu_as_offset(s: &str) -> Cow<'_, str> {
    match s.strip_suffix(['Z', 'z']) {
        Some(head) => Cow::Owned(format!("{head}+00:00")),
        None => Cow::Borrowed(s),
    }
}

fn parse_offset_datetime(s: &str) -> Option<DateTime<chrono::FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    let s = zulu_as_offset(s);
    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&s, fmt).ok())
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// 日期：`YYYY-MM-DD`，以及精度降低的 `YYYY-MM`、`YYYY`（取该时段第一天）
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('-') {
        Some((y, m)) if digits(y, 4) && digits(m, 2) => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        }
        None if digits(s, 4) => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        _ => None,
    }
}

/// 解析 ISO8601 时间戳为 UTC 毫秒。
///
/// 接受带偏移（`Z` / `±hh:mm` / `±hhmm`，秒可省略）、无偏移的日期时间（视为 UTC）
/// 以及日期（`YYYY-MM-DD` / `YYYY-MM` / `YYYY`，UTC 零点）。
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Some(dt) = parse_offset_datetime(s) {
        return Some(dt.timestamp_millis());
    }
    if let Some(ndt) = parse_naive_datetime(s) {
        return Some(ndt.and_utc().timestamp_millis());
    }
    parse_calendar_date(s).map(start_of_day_millis)
}

/// 解析查询参数中的日期；带时间部分时取其书写的日历日。
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    parse_calendar_date(s)
        .or_else(|| parse_offset_datetime(s).map(|dt| dt.date_naive()))
        .or_else(|| parse_naive_datetime(s).map(|ndt| ndt.date()))
}

/// 当日 00:00:00.000 UTC
pub fn start_of_day_millis(day: NaiveDate) -> i64 {
    day.and_hms_milli_opt(0, 0, 0, 0)
        .map_or(i64::MIN, |t| t.and_utc().timestamp_millis())
}

/// 当日 23:59:59.999 UTC
pub fn end_of_day_millis(day: NaiveDate) -> i64 {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .map_or(i64::MAX, |t| t.and_utc().timestamp_millis())
}
