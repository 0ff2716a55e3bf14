//! 统计时间范围与对比窗口

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;

/// `all` 范围在没有任何数据时的回看天数
pub const EMPTY_ALL_LOOKBACK_DAYS: i64 = 30;

/// 统计范围
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    TS,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub enum StatsRange {
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Month,
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    Year,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
}

impl StatsRange {
    /// 固定回看长度，`all` 没有
    pub fn lookback(self) -> Option<Duration> {
        match self {
            StatsRange::Day => Some(Duration::hours(24)),
            StatsRange::Week => Some(Duration::days(7)),
            StatsRange::Month => Some(Duration::days(30)),
            StatsRange::Year => Some(Duration::days(365)),
            StatsRange::All => None,
        }
    }

    /// 解析查询参数，缺省为 7d
    pub fn parse_param(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::default()),
            Some(s) => s.parse().map_err(|_| {
                format!("Invalid range '{}'. Valid: 24h, 7d, 30d, 1y, all", s)
            }),
        }
    }

    /// 计算当前窗口
    ///
    /// `earliest` 只在 `all` 时使用：最早一条记录的时间
    pub fn window(self, now: DateTime<Utc>, earliest: Option<DateTime<Utc>>) -> Window {
        let start = match self.lookback() {
            Some(lookback) => now - lookback,
            None => earliest
                .filter(|t| *t <= now)
                .unwrap_or_else(|| now - Duration::days(EMPTY_ALL_LOOKBACK_DAYS)),
        };
        Window { start, end: now }
    }
}

/// 半开区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// 紧邻的前一个等长窗口
    pub fn previous(&self) -> Window {
        Window {
            start: self.start - self.length(),
            end: self.start,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// 环比变化百分比（四舍五入为整数）
///
/// 上期为 0 时：本期也为 0 → 0，否则 → 100
pub fn pct_change(current: u64, previous: u64) -> i64 {
    if previous == 0 {
        return if current == 0 { 0 } else { 100 };
    }
    let delta = current as f64 - previous as f64;
    (delta / previous as f64 * 100.0).round() as i64
}
