//! 时区感知的时间序列分桶
//!
//! 分桶边界在参考时区（默认 America/Los_Angeles）的本地时间上取整，
//! 再换算回 UTC。换算时在取整后的边界上重新求偏移量，保证跨越夏令时
//! 切换时：
//! - 小时桶始终是 3600 秒
//! - 只有包含切换时刻的那个天/周/月/季度桶是 23 或 25 小时

use std::collections::HashSet;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use ts_rs::TS;

use super::range::StatsRange;
use crate::api::services::types::TS_EXPORT_PATH;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// 单次请求最多生成的桶数量
const MAX_BUCKETS: usize = 20_000;

/// 夏令时跳变最多跳过的小时数
const MAX_GAP_HOURS: i64 = 3;

/// 时间序列聚合粒度
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    TS,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Aggregation {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
}

impl Aggregation {
    /// 各范围允许的粒度
    pub fn allowed_for(range: StatsRange) -> &'static [Aggregation] {
        match range {
            StatsRange::Day => &[Aggregation::Hour],
            _ => &[
                Aggregation::Day,
                Aggregation::Week,
                Aggregation::Month,
                Aggregation::Quarter,
            ],
        }
    }

    pub fn default_for(range: StatsRange) -> Aggregation {
        match range {
            StatsRange::Day => Aggregation::Hour,
            StatsRange::Week | StatsRange::Month => Aggregation::Day,
            StatsRange::Year | StatsRange::All => Aggregation::Month,
        }
    }

    /// 解析 `agg` 参数并校验与 `range` 的组合
    pub fn resolve(range: StatsRange, raw: Option<&str>) -> Result<Aggregation, String> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default_for(range));
        };
        let agg: Aggregation = raw.parse().map_err(|_| {
            format!(
                "Invalid agg '{}'. Valid: hour, day, week, month, quarter",
                raw
            )
        })?;

        let allowed = Self::allowed_for(range);
        if !allowed.contains(&agg) {
            let names: Vec<&str> = allowed.iter().map(|a| a.as_ref()).collect();
            return Err(format!(
                "agg '{}' is not available for range '{}'. Allowed: {}",
                agg,
                range,
                names.join(", ")
            ));
        }
        Ok(agg)
    }
}

/// 解析 IANA 时区名
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// 把参考时区的本地时间换算为 UTC
///
/// - 唯一：直接使用
/// - 重复（秋季回拨）：取较早的时刻
/// - 不存在（春季跳变）：顺延到跳变之后第一个有效时刻
fn resolve_local(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    for _ in 0..=MAX_GAP_HOURS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => {
                candidate = candidate
                    .date()
                    .and_hms_opt(candidate.hour(), 0, 0)
                    .unwrap_or(candidate)
                    + Duration::hours(1);
            }
        }
    }
    Utc.from_utc_datetime(&local)
}

fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

fn first_of_month(date: NaiveDate, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// 把时刻向下取整到所在桶的起点
pub fn floor(instant: DateTime<Utc>, agg: Aggregation, tz: &Tz) -> DateTime<Utc> {
    let local = instant.with_timezone(tz);
    let date = local.date_naive();

    match agg {
        Aggregation::Hour => {
            // 用该时刻自身的偏移量取整，回拨那一小时不会被并到第一次出现的 01:00
            let offset_secs = local.offset().fix().local_minus_utc() as i64;
            let local_naive = local.naive_local();
            let floored = date
                .and_hms_opt(local_naive.hour(), 0, 0)
                .unwrap_or(local_naive);
            Utc.from_utc_datetime(&(floored - Duration::seconds(offset_secs)))
        }
        Aggregation::Day => local_midnight(tz, date),
        Aggregation::Week => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            local_midnight(tz, monday)
        }
        Aggregation::Month => local_midnight(tz, first_of_month(date, date.month())),
        Aggregation::Quarter => {
            let quarter_month = (date.month() - 1) / 3 * 3 + 1;
            local_midnight(tz, first_of_month(date, quarter_month))
        }
    }
}

/// 下一个桶的起点
///
/// 小时桶在绝对时间上加 1 小时；其余粒度在本地日历上前进后重新求偏移
pub fn next(boundary: DateTime<Utc>, agg: Aggregation, tz: &Tz) -> DateTime<Utc> {
    let date = boundary.with_timezone(tz).date_naive();
    let next_date = match agg {
        Aggregation::Hour => return boundary + Duration::hours(1),
        Aggregation::Day => date.succ_opt(),
        Aggregation::Week => date.checked_add_signed(Duration::days(7)),
        Aggregation::Month => date.checked_add_months(Months::new(1)),
        Aggregation::Quarter => date.checked_add_months(Months::new(3)),
    };
    match next_date {
        Some(d) => local_midnight(tz, d),
        None => boundary + Duration::days(1),
    }
}

/// 半开区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Bucket {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// 生成从 `floor(start)` 到 `next(floor(now))` 的全部桶（包含进行中的桶）
pub fn build_buckets(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    agg: Aggregation,
    tz: &Tz,
) -> Vec<Bucket> {
    let stop = next(floor(now, agg, tz), agg, tz);
    let mut cursor = floor(start.min(now), agg, tz);
    let mut buckets = Vec::new();

    while cursor < stop && buckets.len() < MAX_BUCKETS {
        let end = next(cursor, agg, tz);
        if end <= cursor {
            break;
        }
        buckets.push(Bucket { start: cursor, end });
        cursor = end;
    }
    buckets
}

/// 桶标签，按参考时区格式化
pub fn label(bucket_start: DateTime<Utc>, agg: Aggregation, tz: &Tz) -> String {
    let local = bucket_start.with_timezone(tz);
    match agg {
        Aggregation::Hour => local.format("%Y-%m-%d %H:00").to_string(),
        Aggregation::Day | Aggregation::Week => local.format("%Y-%m-%d").to_string(),
        Aggregation::Month => local.format("%Y-%m").to_string(),
        Aggregation::Quarter => format!("{}-Q{}", local.year(), (local.month() - 1) / 3 + 1),
    }
}

/// 时间序列数据点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
    pub views: u64,
    pub visitors: u64,
}

/// 把访问记录分配到桶中，统计访问量与去重访客数
///
/// `rows` 为 (时间, 访客 ID)，无需有序
pub fn bucketize<'a, I>(buckets: &[Bucket], agg: Aggregation, tz: &Tz, rows: I) -> Vec<TimeseriesPoint>
where
    I: IntoIterator<Item = (DateTime<Utc>, &'a str)>,
{
    let mut views = vec![0u64; buckets.len()];
    let mut visitors: Vec<HashSet<&'a str>> = vec![HashSet::new(); buckets.len()];

    for (ts, visitor) in rows {
        // 桶是连续且有序的，二分定位最后一个 start <= ts 的桶
        let idx = buckets.partition_point(|b| b.start <= ts);
        let Some(i) = idx.checked_sub(1) else {
            continue;
        };
        if buckets[i].contains(ts) {
            views[i] += 1;
            visitors[i].insert(visitor);
        }
    }

    buckets
        .iter()
        .zip(views)
        .zip(visitors)
        .map(|((bucket, views), visitors)| TimeseriesPoint {
            start: bucket.start,
            end: bucket.end,
            label: label(bucket.start, agg, tz),
            views,
            visitors: visitors.len() as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    const LA: Tz = DEFAULT_TIMEZONE;

    #[test]
    fn test_resolve_constraints() {
        assert_eq!(
            Aggregation::resolve(StatsRange::Day, None),
            Ok(Aggregation::Hour)
        );
        assert_eq!(
            Aggregation::resolve(StatsRange::Week, None),
            Ok(Aggregation::Day)
        );
        assert_eq!(
            Aggregation::resolve(StatsRange::All, None),
            Ok(Aggregation::Month)
        );
        assert_eq!(
            Aggregation::resolve(StatsRange::Year, Some("quarter")),
            Ok(Aggregation::Quarter)
        );
        assert!(Aggregation::resolve(StatsRange::Day, Some("day")).is_err());
        assert!(Aggregation::resolve(StatsRange::Month, Some("hour")).is_err());
        assert!(Aggregation::resolve(StatsRange::Month, Some("minute")).is_err());
    }

    #[test]
    fn test_hourly_buckets_across_spring_forward() {
        // 2026-03-08 02:00 PST 跳到 03:00 PDT (10:00Z)
        let start = utc(2026, 3, 8, 6, 30);
        let now = utc(2026, 3, 8, 14, 10);
        let buckets = build_buckets(start, now, Aggregation::Hour, &LA);

        assert_eq!(buckets.len(), 9);
        assert_eq!(buckets[0].start, utc(2026, 3, 8, 6, 0));
        assert_eq!(buckets[8].end, utc(2026, 3, 8, 15, 0));
        for b in &buckets {
            assert_eq!(b.duration(), Duration::hours(1));
            let local = b.start.with_timezone(&LA);
            assert_eq!((local.minute(), local.second()), (0, 0));
        }

        let labels: Vec<String> = buckets
            .iter()
            .map(|b| label(b.start, Aggregation::Hour, &LA))
            .collect();
        assert_eq!(labels[3], "2026-03-08 01:00");
        assert_eq!(labels[4], "2026-03-08 03:00");
        assert!(!labels.iter().any(|l| l == "2026-03-08 02:00"));
    }

    #[test]
    fn test_hourly_buckets_across_fall_back() {
        // 2026-11-01 01:00 本地时间出现两次：08:00Z (PDT) 与 09:00Z (PST)
        let buckets = build_buckets(
            utc(2026, 11, 1, 7, 0),
            utc(2026, 11, 1, 10, 59),
            Aggregation::Hour,
            &LA,
        );
        assert_eq!(buckets.len(), 4);
        assert!(buckets.iter().all(|b| b.duration() == Duration::hours(1)));
        let labels: Vec<String> = buckets
            .iter()
            .map(|b| label(b.start, Aggregation::Hour, &LA))
            .collect();
        assert_eq!(
            labels,
            vec![
                "2026-11-01 00:00",
                "2026-11-01 01:00",
                "2026-11-01 01:00",
                "2026-11-01 02:00"
            ]
        );
    }

    #[test]
    fn test_hour_floor_during_repeated_hour() {
        // 第二个 01:30（PST）应取整到 09:00Z，而不是第一个 01:00（08:00Z）
        assert_eq!(
            floor(utc(2026, 11, 1, 9, 30), Aggregation::Hour, &LA),
            utc(2026, 11, 1, 9, 0)
        );
        assert_eq!(
            floor(utc(2026, 11, 1, 8, 30), Aggregation::Hour, &LA),
            utc(2026, 11, 1, 8, 0)
        );
    }

    #[test]
    fn test_daily_bucket_on_transition_days() {
        let spring = build_buckets(
            utc(2026, 3, 7, 12, 0),
            utc(2026, 3, 9, 12, 0),
            Aggregation::Day,
            &LA,
        );
        assert_eq!(spring.len(), 3);
        assert_eq!(spring[0].start, utc(2026, 3, 7, 8, 0));
        assert_eq!(spring[0].duration(), Duration::hours(24));
        assert_eq!(spring[1].start, utc(2026, 3, 8, 8, 0));
        assert_eq!(spring[1].duration(), Duration::hours(23));
        assert_eq!(spring[2].start, utc(2026, 3, 9, 7, 0));
        assert_eq!(spring[2].duration(), Duration::hours(24));

        let fall = build_buckets(
            utc(2026, 11, 1, 12, 0),
            utc(2026, 11, 1, 12, 0),
            Aggregation::Day,
            &LA,
        );
        assert_eq!(fall.len(), 1);
        assert_eq!(fall[0].start, utc(2026, 11, 1, 7, 0));
        assert_eq!(fall[0].duration(), Duration::hours(25));
    }

    #[test]
    fn test_week_month_quarter_floors() {
        // 2026-03-11 是周三，周一为 03-09（PDT）
        assert_eq!(
            floor(utc(2026, 3, 11, 20, 0), Aggregation::Week, &LA),
            utc(2026, 3, 9, 7, 0)
        );
        assert_eq!(
            floor(utc(2026, 1, 15, 20, 0), Aggregation::Month, &LA),
            utc(2026, 1, 1, 8, 0)
        );
        assert_eq!(
            floor(utc(2026, 5, 15, 20, 0), Aggregation::Quarter, &LA),
            utc(2026, 4, 1, 7, 0)
        );
        // UTC 已是 7 月 1 日，本地仍是 6 月 30 日 → 第二季度
        assert_eq!(
            floor(utc(2026, 7, 1, 3, 0), Aggregation::Quarter, &LA),
            utc(2026, 4, 1, 7, 0)
        );
    }

    #[test]
    fn test_quarter_labels_and_steps() {
        let buckets = build_buckets(
            utc(2026, 1, 10, 0, 0),
            utc(2026, 12, 31, 0, 0),
            Aggregation::Quarter,
            &LA,
        );
        let labels: Vec<String> = buckets
            .iter()
            .map(|b| label(b.start, Aggregation::Quarter, &LA))
            .collect();
        assert_eq!(labels, vec!["2026-Q1", "2026-Q2", "2026-Q3", "2026-Q4"]);
    }

    #[test]
    fn test_in_progress_bucket_included() {
        let now = utc(2026, 6, 10, 18, 45);
        let buckets = build_buckets(now - Duration::hours(24), now, Aggregation::Hour, &LA);
        assert_eq!(buckets.len(), 25);
        let last = buckets.last().unwrap();
        assert!(last.contains(now));
    }

    #[test]
    fn test_bucketize_counts_views_and_distinct_visitors() {
        let buckets = build_buckets(
            utc(2026, 6, 10, 0, 0),
            utc(2026, 6, 10, 2, 30),
            Aggregation::Hour,
            &LA,
        );
        let rows = vec![
            (utc(2026, 6, 10, 0, 5), "v1"),
            (utc(2026, 6, 10, 0, 55), "v1"),
            (utc(2026, 6, 10, 0, 59), "v2"),
            (utc(2026, 6, 10, 2, 0), "v3"),
            // 超出范围
            (utc(2026, 6, 9, 23, 59), "v9"),
            (utc(2026, 6, 10, 3, 0), "v9"),
        ];
        let points = bucketize(&buckets, Aggregation::Hour, &LA, rows);
        assert_eq!(points.len(), 3);
        assert_eq!((points[0].views, points[0].visitors), (3, 2));
        assert_eq!((points[1].views, points[1].visitors), (0, 0));
        assert_eq!((points[2].views, points[2].visitors), (1, 1));
    }

    #[test]
    fn test_server_timezone_independent() {
        // 同一时刻在不同参考时区得到不同日界
        let instant = utc(2026, 6, 10, 5, 0);
        assert_eq!(floor(instant, Aggregation::Day, &LA), utc(2026, 6, 9, 7, 0));
        assert_eq!(
            floor(instant, Aggregation::Day, &chrono_tz::UTC),
            utc(2026, 6, 10, 0, 0)
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("America/Los_Angeles"), Some(LA));
        assert_eq!(parse_timezone("Mars/Olympus_Mons"), None);
    }
}
