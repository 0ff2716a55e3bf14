//! GeoLite2-City 本地库查询

use std::net::IpAddr;

use async_trait::async_trait;
use maxminddb::{Reader, geoip2};
use tracing::trace;

use super::provider::{GeoInfo, GeoIpLookup};

pub struct MaxMindProvider {
    reader: Reader<Vec<u8>>,
}

impl MaxMindProvider {
    /// 整个文件读入内存；路径不可读时返回错误，由调用方降级
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        Ok(Self {
            reader: Reader::open_readfile(path)?,
        })
    }
}

fn to_geo(record: geoip2::City<'_>) -> GeoInfo {
    GeoInfo {
        country: record.country.iso_code.map(str::to_string),
        // 只取一级行政区
        region: record
            .subdivisions
            .first()
            .and_then(|s| s.iso_code)
            .map(str::to_string),
        city: record.city.names.english.map(str::to_string),
        latitude: record.location.latitude,
        longitude: record.location.longitude,
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = ip.parse().ok()?;
        let record: geoip2::City = self.reader.lookup(addr).ok()?.decode().ok()??;

        let geo = to_geo(record);
        trace!("GeoLite2 {} -> {:?}", ip, geo);
        // 库里没有任何字段时交给下一步推断
        (!geo.is_empty()).then_some(geo)
    }

    fn name(&self) -> &'static str {
        "GeoLite2"
    }
}
