//! Analytics read side
//!
//! 汇总、排行、地理分布、时间序列。所有查询都先确定时间窗口，
//! 再从 page_views 读取可统计的记录在内存中聚合。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::analytics::aggregate::{self, GeoPoint, Summary, TopPage};
use crate::analytics::bucket::{self, Aggregation, DEFAULT_TIMEZONE, TimeseriesPoint};
use crate::analytics::cluster::{self, ClusterOptions, GeoCluster};
use crate::analytics::range::{StatsRange, Window};
use crate::config::AnalyticsConfig;
use crate::errors::{Result, SiteError};
use crate::storage::SeaOrmStorage;

/// 时间序列查询结果
#[derive(Debug, Clone)]
pub struct Timeseries {
    pub agg: Aggregation,
    pub points: Vec<TimeseriesPoint>,
}

/// 地理分布查询结果
#[derive(Debug, Clone)]
pub struct GeoDistribution {
    pub points: Vec<GeoPoint>,
    pub clusters: Option<Vec<GeoCluster>>,
}

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    timezone: Tz,
    cluster_options: ClusterOptions,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>, config: &AnalyticsConfig) -> Self {
        let timezone = bucket::parse_timezone(&config.timezone).unwrap_or_else(|| {
            warn!(
                "Unknown analytics timezone '{}', falling back to {}",
                config.timezone, DEFAULT_TIMEZONE
            );
            DEFAULT_TIMEZONE
        });
        Self {
            storage,
            timezone,
            cluster_options: ClusterOptions::default(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn parse_range(raw: Option<&str>) -> Result<StatsRange> {
        StatsRange::parse_param(raw).map_err(SiteError::validation)
    }

    /// `zoom` 必须是 0..=max_zoom 的整数
    pub fn parse_zoom(&self, raw: Option<&str>) -> Result<Option<u8>> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        match raw.parse::<u8>() {
            Ok(z) if z <= self.cluster_options.max_zoom => Ok(Some(z)),
            _ => Err(SiteError::validation(format!(
                "Invalid zoom '{}'. Expected an integer between 0 and {}",
                raw, self.cluster_options.max_zoom
            ))),
        }
    }

    async fn window(&self, range: StatsRange, now: DateTime<Utc>) -> Result<Window> {
        let earliest = match range {
            StatsRange::All => self.storage.earliest_view_at().await?,
            _ => None,
        };
        Ok(range.window(now, earliest))
    }

    pub async fn summary(&self, range: StatsRange) -> Result<Summary> {
        let now = Utc::now();
        let window = self.window(range, now).await?;
        let current = self.storage.fetch_views(&window).await?;
        let previous = self.storage.fetch_views(&window.previous()).await?;

        debug!(
            "Summary {}: {} rows in window, {} in previous",
            range,
            current.len(),
            previous.len()
        );
        Ok(Summary::compare(
            range,
            &aggregate::summarize(&current),
            &aggregate::summarize(&previous),
        ))
    }

    pub async fn top_pages(&self, range: StatsRange) -> Result<Vec<TopPage>> {
        let window = self.window(range, Utc::now()).await?;
        let rows = self.storage.fetch_views(&window).await?;
        Ok(aggregate::top_pages(&rows))
    }

    pub async fn geo(&self, range: StatsRange, zoom: Option<u8>) -> Result<GeoDistribution> {
        let window = self.window(range, Utc::now()).await?;
        let rows = self.storage.fetch_views(&window).await?;
        let points = aggregate::geo_points(&rows);
        let clusters = zoom.map(|z| cluster::cluster(&points, z, &self.cluster_options));
        Ok(GeoDistribution { points, clusters })
    }

    pub async fn timeseries(&self, range: StatsRange, agg_param: Option<&str>) -> Result<Timeseries> {
        let agg = Aggregation::resolve(range, agg_param).map_err(SiteError::validation)?;
        let now = Utc::now();
        let window = self.window(range, now).await?;

        let buckets = bucket::build_buckets(window.start, now, agg, &self.timezone);
        let Some(first) = buckets.first() else {
            return Ok(Timeseries {
                agg,
                points: Vec::new(),
            });
        };

        // 从第一个桶的起点取数，首个桶不会只统计到一半
        let fetch = Window {
            start: first.start,
            end: now,
        };
        let rows = self.storage.fetch_views(&fetch).await?;
        let points = bucket::bucketize(
            &buckets,
            agg,
            &self.timezone,
            rows.iter().map(|r| (r.created_at, r.visitor_id.as_str())),
        );
        Ok(Timeseries { agg, points })
    }
}
