//! 地理位置解析
//!
//! - 边缘节点请求头、Accept-Language、开发环境模拟数据
//! - IP 查询：MaxMind GeoLite2 本地数据库，或外部 API (ip-api.com)

mod external_api;
mod maxmind;
mod provider;
mod resolver;

pub use provider::{GeoInfo, GeoIpLookup, GeoIpProvider};
pub use resolver::{GeoHeaders, GeoResolver, country_from_accept_language, geo_from_headers};
