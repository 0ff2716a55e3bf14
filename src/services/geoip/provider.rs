//! GeoIP Provider 抽象层
//!
//! 根据配置自动选择实现：
//! 1. maxminddb_path 已配置且文件可读 → MaxMindProvider
//! 2. 否则 → ExternalApiProvider

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::AnalyticsConfig;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "US", "DE")
    pub country: Option<String>,
    /// 一级行政区代码 (e.g., "CA")
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoInfo {
    pub fn is_complete(&self) -> bool {
        self.country.is_some()
            && self.region.is_some()
            && self.city.is_some()
            && self.latitude.is_some()
            && self.longitude.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == GeoInfo::default()
    }

    /// 只填充仍然缺失的字段
    ///
    /// 国家已知且与 `other` 不同时整条忽略，避免拼出不同地点的组合
    pub fn fill_missing(&mut self, other: GeoInfo) {
        match (&self.country, &other.country) {
            (Some(ours), Some(theirs)) if ours == theirs => {}
            (Some(_), _) => return,
            (None, _) => self.country = other.country,
        }
        if self.region.is_none() {
            self.region = other.region;
        }
        if self.city.is_none() {
            self.city = other.city;
        }
        // 坐标成对填充，避免拼出不存在的点
        if self.latitude.is_none() && self.longitude.is_none() {
            self.latitude = other.latitude;
            self.longitude = other.longitude;
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP Provider
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    pub fn new(config: &AnalyticsConfig) -> Self {
        let inner: Arc<dyn GeoIpLookup> = match config.maxminddb_path.as_deref() {
            Some(path) => match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to external API",
                        path, e
                    );
                    Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
                }
            },
            None => {
                debug!("GeoIP: No MaxMind database configured, using external API");
                Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
            }
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// 使用自定义实现（测试或其它数据源）
    pub fn from_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        self.inner.lookup(ip).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
