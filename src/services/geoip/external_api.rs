//! 外部 GeoIP HTTP API 实现（默认 ip-api.com）
//!
//! 内置 moka 缓存 + singleflight，同一 IP 的并发查询只发一次请求

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};

/// 缓存 TTL（15 分钟）
const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;
const HTTP_TIMEOUT_SECS: u64 = 2;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

pub struct ExternalApiProvider {
    /// `{ip}` 为占位符
    api_url_template: String,
    /// None 也会被缓存，失败的 IP 在 TTL 内不会重复请求
    cache: Cache<String, Option<GeoInfo>>,
}

/// 解析 API 响应，兼容 ip-api.com 与常见的 snake_case 字段名
pub(crate) fn parse_api_response(json: &serde_json::Value) -> Option<GeoInfo> {
    if json["status"].as_str() == Some("fail") {
        return None;
    }

    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| json[*k].as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    let number = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| json[*k].as_f64())
            .filter(|v| v.is_finite())
    };

    let geo = GeoInfo {
        country: text(&["countryCode", "country_code"]).map(|c| c.to_uppercase()),
        region: text(&["region", "region_code"]),
        city: text(&["city"]),
        latitude: number(&["lat", "latitude"]),
        longitude: number(&["lon", "longitude"]),
    };
    (!geo.is_empty()).then_some(geo)
}

impl ExternalApiProvider {
    pub fn new(api_url_template: &str) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_url_template: api_url_template.to_string(),
            cache,
        }
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn fetch_from_api_sync(url: String) -> Option<GeoInfo> {
        let resp = match get_agent().get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoIP API request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        let geo = parse_api_response(&json);
        trace!("External API lookup: {:?}", geo);
        geo
    }

    async fn fetch_from_api(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", ip);

        tokio::task::spawn_blocking(move || Self::fetch_from_api_sync(url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                None
            })
    }
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        // get_with 自带 singleflight：同一 key 的并发调用只执行一次闭包
        self.cache
            .get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch_from_api(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
