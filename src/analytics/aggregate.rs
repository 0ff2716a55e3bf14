//! 访问记录聚合
//!
//! 所有函数都是对内存中记录的单次线性扫描，调用方负责按时间窗口取数
//! 并排除 bot / admin / private 记录。

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::range::{StatsRange, pct_change};
use crate::api::services::types::TS_EXPORT_PATH;

/// 排行榜最多返回的条目数
pub const TOP_PAGES_LIMIT: usize = 50;

/// 根路径的显示名
pub const HOME_LABEL: &str = "Home";

/// 聚合所需的访问记录字段
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRecord {
    pub path: String,
    pub visitor_id: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<migration::entities::page_view::Model> for ViewRecord {
    fn from(m: migration::entities::page_view::Model) -> Self {
        Self {
            path: m.path,
            visitor_id: m.visitor_id,
            country: m.country,
            region: m.region,
            city: m.city,
            latitude: m.latitude,
            longitude: m.longitude,
            created_at: m.created_at,
        }
    }
}

/// `/` 显示为 Home，其余原样
pub fn display_path(path: &str) -> String {
    if path == "/" {
        HOME_LABEL.to_string()
    } else {
        path.to_string()
    }
}

/// 单个窗口的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    pub views: u64,
    pub unique_visitors: u64,
    pub countries: u64,
    /// 原始路径
    pub top_page: Option<String>,
    pub top_page_views: u64,
}

pub fn summarize(rows: &[ViewRecord]) -> Totals {
    let mut visitors: HashSet<&str> = HashSet::new();
    let mut countries: HashSet<&str> = HashSet::new();
    let mut per_path: HashMap<&str, u64> = HashMap::new();
    let mut top: Option<(&str, u64)> = None;

    for row in rows {
        visitors.insert(row.visitor_id.as_str());
        if let Some(country) = row.country.as_deref().filter(|c| !c.is_empty()) {
            countries.insert(country);
        }

        let count = per_path.entry(row.path.as_str()).or_insert(0);
        *count += 1;
        // 严格大于才替换：并列时先到达最大值的路径胜出
        if top.is_none_or(|(_, best)| *count > best) {
            top = Some((row.path.as_str(), *count));
        }
    }

    Totals {
        views: rows.len() as u64,
        unique_visitors: visitors.len() as u64,
        countries: countries.len() as u64,
        top_page: top.map(|(p, _)| p.to_string()),
        top_page_views: top.map(|(_, c)| c).unwrap_or(0),
    }
}

/// `GET /api/admin/stats/summary` 响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub views: u64,
    pub unique_visitors: u64,
    pub countries: u64,
    pub top_page: Option<String>,
    pub top_page_views: u64,
    pub views_change: i64,
    pub visitors_change: i64,
    pub countries_change: i64,
    pub range: StatsRange,
}

impl Summary {
    pub fn compare(range: StatsRange, current: &Totals, previous: &Totals) -> Self {
        Self {
            views: current.views,
            unique_visitors: current.unique_visitors,
            countries: current.countries,
            top_page: current.top_page.as_deref().map(display_path),
            top_page_views: current.top_page_views,
            views_change: pct_change(current.views, previous.views),
            visitors_change: pct_change(current.unique_visitors, previous.unique_visitors),
            countries_change: pct_change(current.countries, previous.countries),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TopPage {
    pub path: String,
    pub label: String,
    pub views: u64,
    pub visitors: u64,
}

pub fn top_pages(rows: &[ViewRecord]) -> Vec<TopPage> {
    let mut groups: HashMap<&str, (u64, HashSet<&str>)> = HashMap::new();
    for row in rows {
        let entry = groups.entry(row.path.as_str()).or_default();
        entry.0 += 1;
        entry.1.insert(row.visitor_id.as_str());
    }

    let mut pages: Vec<TopPage> = groups
        .into_iter()
        .map(|(path, (views, visitors))| TopPage {
            path: path.to_string(),
            label: display_path(path),
            views,
            visitors: visitors.len() as u64,
        })
        .collect();

    pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.path.cmp(&b.path)));
    pages.truncate(TOP_PAGES_LIMIT);
    pages
}

/// 按位置分组的访客点
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoPoint {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// 去重访客数
    pub visitors: u64,
    pub views: u64,
}

// f64 不能直接作为 HashMap 键，用位模式代替
type LocationKey<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    Option<u64>,
    Option<u64>,
);

/// 按 (country, region, city, lat, long) 分组，没有任何地理信息的记录不计入
pub fn geo_points(rows: &[ViewRecord]) -> Vec<GeoPoint> {
    let mut order: Vec<LocationKey<'_>> = Vec::new();
    let mut groups: HashMap<LocationKey<'_>, (&ViewRecord, u64, HashSet<&str>)> = HashMap::new();

    for row in rows {
        if row.country.is_none() && row.latitude.is_none() && row.longitude.is_none() {
            continue;
        }
        let key = (
            row.country.as_deref(),
            row.region.as_deref(),
            row.city.as_deref(),
            row.latitude.map(f64::to_bits),
            row.longitude.map(f64::to_bits),
        );
        let entry = groups.entry(key).or_insert_with(|| {
            order.push(key);
            (row, 0, HashSet::new())
        });
        entry.1 += 1;
        entry.2.insert(row.visitor_id.as_str());
    }

    let mut points: Vec<GeoPoint> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|(sample, views, visitors)| GeoPoint {
            country: sample.country.clone(),
            region: sample.region.clone(),
            city: sample.city.clone(),
            latitude: sample.latitude,
            longitude: sample.longitude,
            visitors: visitors.len() as u64,
            views,
        })
        .collect();

    // 稳定排序，访客数相同时保持首次出现的顺序
    points.sort_by(|a, b| b.visitors.cmp(&a.visitors));
    points
}
