//! 访问记录的地理位置解析链
//!
//! 每一步只填充仍然缺失的字段：
//! 1. 平台边缘节点请求头
//! 2. IP 查询（可选，跳过内网地址）
//! 3. `Accept-Language` 地区推断（只填国家）
//! 4. 非 production 且仍没有坐标：轮换的模拟数据（前两步都没有结果时整组替换）

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::HttpRequest;
use tracing::trace;

use super::provider::{GeoInfo, GeoIpProvider};
use crate::config::{AnalyticsConfig, GeoHeaderNames};
use crate::utils::ip::is_private_or_local;

/// Cloudflare 的国家头，作为国家的后备来源
const CF_COUNTRY_HEADER: &str = "cf-ipcountry";

/// 平台用于“未知 / Tor”的占位国家代码
const PLACEHOLDER_COUNTRIES: [&str; 2] = ["XX", "T1"];

/// 本地开发时轮换使用的模拟位置
const MOCK_LOCATIONS: [(&str, &str, &str, f64, f64); 7] = [
    ("US", "CA", "San Francisco", 37.7749, -122.4194),
    ("US", "NY", "New York", 40.7128, -74.0060),
    ("GB", "ENG", "London", 51.5074, -0.1278),
    ("DE", "BE", "Berlin", 52.5200, 13.4050),
    ("JP", "13", "Tokyo", 35.6762, 139.6503),
    ("BR", "SP", "São Paulo", -23.5505, -46.6333),
    ("AU", "NSW", "Sydney", -33.8688, 151.2093),
];

/// 从请求中取出的地理相关请求头
#[derive(Debug, Clone, Default)]
pub struct GeoHeaders {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub cf_country: Option<String>,
    pub accept_language: Option<String>,
}

impl GeoHeaders {
    pub fn from_request(req: &HttpRequest, names: &GeoHeaderNames) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        Self {
            country: header(&names.country),
            region: header(&names.region),
            city: header(&names.city),
            latitude: header(&names.latitude),
            longitude: header(&names.longitude),
            cf_country: header(CF_COUNTRY_HEADER),
            accept_language: header("accept-language"),
        }
    }
}

fn normalize_country(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_uppercase();
    if code.len() != 2 || PLACEHOLDER_COUNTRIES.contains(&code.as_str()) {
        return None;
    }
    code.chars().all(|c| c.is_ascii_alphabetic()).then_some(code)
}

fn parse_coordinate(raw: Option<&str>, limit: f64) -> Option<f64> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
}

/// 边缘节点请求头 → GeoInfo；城市名按 URL 编码传输
pub fn geo_from_headers(headers: &GeoHeaders) -> GeoInfo {
    let country = normalize_country(headers.country.as_deref())
        .or_else(|| normalize_country(headers.cf_country.as_deref()));
    let city = headers.city.as_deref().map(|c| {
        urlencoding::decode(c)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| c.to_string())
    });
    let latitude = parse_coordinate(headers.latitude.as_deref(), 90.0);
    let longitude = parse_coordinate(headers.longitude.as_deref(), 180.0);
    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    GeoInfo {
        country,
        region: headers.region.clone(),
        city,
        latitude,
        longitude,
    }
}

/// `en-US,en;q=0.9` → `US`：第一个带两字母地区子标签的语言标签
pub fn country_from_accept_language(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let tag = entry.split(';').next()?.trim();
        tag.split(['-', '_'])
            .skip(1)
            .find(|sub| sub.len() == 2 && sub.chars().all(|c| c.is_ascii_alphabetic()))
            .map(|sub| sub.to_uppercase())
    })
}

pub struct GeoResolver {
    ip_lookup: Option<GeoIpProvider>,
    use_mock: bool,
    mock_cursor: AtomicUsize,
}

impl GeoResolver {
    pub fn new(config: &AnalyticsConfig, production: bool) -> Self {
        let ip_lookup = config.enable_ip_lookup.then(|| GeoIpProvider::new(config));
        Self::with_provider(ip_lookup, !production && config.mock_geo)
    }

    pub fn with_provider(ip_lookup: Option<GeoIpProvider>, use_mock: bool) -> Self {
        Self {
            ip_lookup,
            use_mock,
            mock_cursor: AtomicUsize::new(0),
        }
    }

    fn next_mock(&self) -> GeoInfo {
        let idx = self.mock_cursor.fetch_add(1, Ordering::Relaxed) % MOCK_LOCATIONS.len();
        let (country, region, city, lat, lon) = MOCK_LOCATIONS[idx];
        GeoInfo {
            country: Some(country.to_string()),
            region: Some(region.to_string()),
            city: Some(city.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    pub async fn resolve(&self, headers: &GeoHeaders, client_ip: Option<&str>) -> GeoInfo {
        let mut geo = geo_from_headers(headers);

        if !geo.is_complete()
            && let Some(provider) = &self.ip_lookup
            && let Some(ip) = client_ip
            && ip
                .parse::<IpAddr>()
                .is_ok_and(|addr| !is_private_or_local(&addr))
            && let Some(found) = provider.lookup(ip).await
        {
            trace!("GeoIP {} resolved {} via {}", ip, found.country.as_deref().unwrap_or("-"), provider.provider_name());
            geo.fill_missing(found);
        }

        let located = !geo.is_empty();

        if geo.country.is_none()
            && let Some(country) = headers
                .accept_language
                .as_deref()
                .and_then(country_from_accept_language)
        {
            geo.country = Some(country);
        }

        // Accept-Language 只有国家，地图仍然需要坐标
        if self.use_mock && geo.latitude.is_none() {
            if located {
                geo.fill_missing(self.next_mock());
            } else {
                geo = self.next_mock();
            }
        }

        geo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::services::geoip::GeoIpLookup;

    struct FixedLookup;

    #[async_trait]
    impl GeoIpLookup for FixedLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            Some(GeoInfo {
                country: Some("CA".into()),
                region: Some("BC".into()),
                city: Some("Vancouver".into()),
                latitude: Some(49.28),
                longitude: Some(-123.12),
            })
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }
    }

    #[test]
    fn test_accept_language_region() {
        assert_eq!(
            country_from_accept_language("en-US,en;q=0.9").as_deref(),
            Some("US")
        );
        assert_eq!(
            country_from_accept_language("fr;q=0.9, de-DE;q=0.8").as_deref(),
            Some("DE")
        );
        assert_eq!(
            country_from_accept_language("zh-Hant-TW").as_deref(),
            Some("TW")
        );
        assert_eq!(country_from_accept_language("en, fr"), None);
        assert_eq!(country_from_accept_language("es-419"), None);
    }

    #[test]
    fn test_headers_parsed_and_decoded() {
        let headers = GeoHeaders {
            country: Some("us".into()),
            region: Some("CA".into()),
            city: Some("San%20Jos%C3%A9".into()),
            latitude: Some("37.33".into()),
            longitude: Some("-121.89".into()),
            ..Default::default()
        };
        let geo = geo_from_headers(&headers);
        assert_eq!(geo.country.as_deref(), Some("US"));
        assert_eq!(geo.city.as_deref(), Some("San José"));
        assert_eq!(geo.latitude, Some(37.33));
        assert!(geo.is_complete());
    }

    #[test]
    fn test_placeholder_country_falls_back_to_cf() {
        let headers = GeoHeaders {
            country: Some("XX".into()),
            cf_country: Some("NL".into()),
            ..Default::default()
        };
        assert_eq!(geo_from_headers(&headers).country.as_deref(), Some("NL"));

        let tor = GeoHeaders {
            cf_country: Some("T1".into()),
            ..Default::default()
        };
        assert_eq!(geo_from_headers(&tor).country, None);
    }

    #[test]
    fn test_half_coordinates_dropped() {
        let headers = GeoHeaders {
            latitude: Some("12.5".into()),
            longitude: Some("abc".into()),
            ..Default::default()
        };
        let geo = geo_from_headers(&headers);
        assert_eq!((geo.latitude, geo.longitude), (None, None));
    }

    #[tokio::test]
    async fn test_accept_language_fills_country_only() {
        let resolver = GeoResolver::with_provider(None, false);
        let headers = GeoHeaders {
            accept_language: Some("en-GB,en;q=0.8".into()),
            ..Default::default()
        };
        let geo = resolver.resolve(&headers, Some("203.0.113.9")).await;
        assert_eq!(geo.country.as_deref(), Some("GB"));
        assert_eq!(geo.city, None);
    }

    #[tokio::test]
    async fn test_mock_rotation_in_development() {
        let resolver = GeoResolver::with_provider(None, true);
        let empty = GeoHeaders::default();
        let first = resolver.resolve(&empty, None).await;
        let second = resolver.resolve(&empty, None).await;
        assert!(first.is_complete());
        assert_ne!(first.city, second.city);
    }

    #[tokio::test]
    async fn test_no_mock_in_production() {
        let resolver = GeoResolver::with_provider(None, false);
        let geo = resolver.resolve(&GeoHeaders::default(), None).await;
        assert!(geo.is_empty());
    }

    #[tokio::test]
    async fn test_ip_lookup_skips_private_addresses() {
        let provider = GeoIpProvider::from_lookup(Arc::new(FixedLookup));
        let resolver = GeoResolver::with_provider(Some(provider), false);

        let private = resolver
            .resolve(&GeoHeaders::default(), Some("192.168.1.20"))
            .await;
        assert!(private.is_empty());

        let public = resolver
            .resolve(&GeoHeaders::default(), Some("203.0.113.9"))
            .await;
        assert_eq!(public.city.as_deref(), Some("Vancouver"));
    }

    #[tokio::test]
    async fn test_edge_headers_win_over_ip_lookup() {
        let provider = GeoIpProvider::from_lookup(Arc::new(FixedLookup));
        let resolver = GeoResolver::with_provider(Some(provider), false);
        let headers = GeoHeaders {
            country: Some("US".into()),
            ..Default::default()
        };
        let geo = resolver.resolve(&headers, Some("203.0.113.9")).await;
        assert_eq!(geo.country.as_deref(), Some("US"));
        // 查询结果是另一个国家，不混入地区和坐标
        assert_eq!(geo.region, None);
        assert_eq!(geo.city, None);
        assert_eq!(geo.latitude, None);

        let same_country = GeoHeaders {
            country: Some("CA".into()),
            city: Some("Victoria".into()),
            ..Default::default()
        };
        let geo = resolver.resolve(&same_country, Some("203.0.113.9")).await;
        assert_eq!(geo.city.as_deref(), Some("Victoria"));
        assert_eq!(geo.region.as_deref(), Some("BC"));
        assert_eq!(geo.latitude, Some(49.28));
    }

    #[tokio::test]
    async fn test_mock_applies_with_browser_accept_language() {
        let resolver = GeoResolver::with_provider(None, true);
        let headers = GeoHeaders {
            accept_language: Some("en-US,en;q=0.9".into()),
            ..Default::default()
        };
        let geo = resolver.resolve(&headers, Some("127.0.0.1")).await;
        assert!(geo.is_complete());
        assert!(geo.latitude.is_some() && geo.longitude.is_some());
    }

    #[tokio::test]
    async fn test_mock_fills_coordinates_for_matching_edge_country() {
        let resolver = GeoResolver::with_provider(None, true);
        // 第一个模拟位置是 US / San Francisco
        let headers = GeoHeaders {
            country: Some("US".into()),
            region: Some("WA".into()),
            ..Default::default()
        };
        let geo = resolver.resolve(&headers, None).await;
        assert_eq!(geo.country.as_deref(), Some("US"));
        assert_eq!(geo.region.as_deref(), Some("WA"));
        assert!(geo.latitude.is_some());
    }
}
