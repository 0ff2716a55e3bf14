//! 第一方访问统计
//!
//! - 采集：访客/会话识别、bot 与 DNT 过滤、来源解析
//! - 读取：时间窗口、汇总、排行、地理分组、时区分桶、地图聚类

pub mod aggregate;
pub mod bot;
pub mod bucket;
pub mod cluster;
pub mod collector;
pub mod identity;
pub mod range;
pub mod source;

pub use aggregate::{GeoPoint, Summary, TopPage, Totals, ViewRecord};
pub use bucket::{Aggregation, TimeseriesPoint};
pub use cluster::{ClusterOptions, GeoCluster};
pub use collector::{CollectOutcome, CollectRequest, SkipReason};
pub use range::{StatsRange, Window};
