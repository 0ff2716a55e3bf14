//! 地图点聚类
//!
//! 在给定缩放级别下把经纬度投影到 Web Mercator 像素坐标，按访客数从大到小
//! 贪心地把半径内的点合并为一个簇。

use serde::Serialize;
use ts_rs::TS;

use super::aggregate::GeoPoint;
use crate::api::services::types::TS_EXPORT_PATH;

/// Web Mercator 可表示的最大纬度
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy)]
pub struct ClusterOptions {
    /// 像素半径
    pub radius: f64,
    pub tile_size: f64,
    pub max_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 60.0,
            tile_size: 256.0,
            max_zoom: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct GeoCluster {
    pub latitude: f64,
    pub longitude: f64,
    /// 簇内访客总数
    pub visitors: u64,
    pub views: u64,
    pub point_count: usize,
    /// 展开该簇时地图应缩放到的级别
    pub expansion_zoom: u8,
}

#[derive(Debug, Clone, Copy)]
struct Projected {
    lat: f64,
    lon: f64,
    visitors: u64,
    views: u64,
}

/// 经纬度 → 缩放级别 `zoom` 下的世界像素坐标
pub fn project(lat: f64, lon: f64, zoom: u8, tile_size: f64) -> (f64, f64) {
    let scale = tile_size * 2f64.powi(zoom as i32);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    (x, y)
}

fn within(a: &Projected, b: &Projected, zoom: u8, opts: &ClusterOptions) -> bool {
    let (ax, ay) = project(a.lat, a.lon, zoom, opts.tile_size);
    let (bx, by) = project(b.lat, b.lon, zoom, opts.tile_size);
    (ax - bx).hypot(ay - by) <= opts.radius
}

/// 对带坐标的点做聚类，没有坐标的点被忽略
pub fn cluster(points: &[GeoPoint], zoom: u8, opts: &ClusterOptions) -> Vec<GeoCluster> {
    let zoom = zoom.min(opts.max_zoom);

    let mut items: Vec<Projected> = points
        .iter()
        .filter_map(|p| match (p.latitude, p.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(Projected {
                lat,
                lon,
                visitors: p.visitors,
                views: p.views,
            }),
            _ => None,
        })
        .collect();
    items.sort_by(|a, b| b.visitors.cmp(&a.visitors));

    let mut assigned = vec![false; items.len()];
    let mut clusters = Vec::new();

    for i in 0..items.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let seed = items[i];
        let mut members = vec![seed];

        for j in (i + 1)..items.len() {
            if !assigned[j] && within(&seed, &items[j], zoom, opts) {
                assigned[j] = true;
                members.push(items[j]);
            }
        }

        clusters.push(build_cluster(&members, zoom, opts));
    }

    clusters
}

fn build_cluster(members: &[Projected], zoom: u8, opts: &ClusterOptions) -> GeoCluster {
    let visitors: u64 = members.iter().map(|m| m.visitors).sum();
    let views: u64 = members.iter().map(|m| m.views).sum();

    // 访客数加权的中心；全部为 0 时退化为算术平均
    let weight = |m: &Projected| if visitors == 0 { 1.0 } else { m.visitors as f64 };
    let total_weight: f64 = members.iter().map(weight).sum();
    let latitude = members.iter().map(|m| m.lat * weight(m)).sum::<f64>() / total_weight;
    let longitude = members.iter().map(|m| m.lon * weight(m)).sum::<f64>() / total_weight;

    GeoCluster {
        latitude,
        longitude,
        visitors,
        views,
        point_count: members.len(),
        expansion_zoom: expansion_zoom(members, zoom, opts),
    }
}

/// 第一个让成员不再全部落在种子半径内的缩放级别，上限为 `max_zoom`
fn expansion_zoom(members: &[Projected], zoom: u8, opts: &ClusterOptions) -> u8 {
    let Some((seed, rest)) = members.split_first() else {
        return zoom;
    };
    if rest.is_empty() {
        return zoom;
    }
    for z in (zoom + 1)..=opts.max_zoom {
        if rest.iter().any(|m| !within(seed, m, z, opts)) {
            return z;
        }
    }
    opts.max_zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64, visitors: u64) -> GeoPoint {
        GeoPoint {
            country: Some("US".into()),
            region: None,
            city: None,
            latitude: Some(lat),
            longitude: Some(lon),
            visitors,
            views: visitors,
        }
    }

    #[test]
    fn test_project_origin() {
        let (x, y) = project(0.0, 0.0, 0, 256.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
        let (x, _) = project(0.0, 180.0, 1, 256.0);
        assert!((x - 512.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_points_merge_at_low_zoom() {
        // 旧金山与奥克兰
        let points = vec![point(37.77, -122.42, 5), point(37.80, -122.27, 1)];
        let clusters = cluster(&points, 3, &ClusterOptions::default());
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.visitors, 6);
        assert_eq!(c.point_count, 2);
        // 中心偏向访客多的点
        assert!(c.longitude < -122.35);
        assert!(c.expansion_zoom > 3 && c.expansion_zoom <= 16);
    }

    #[test]
    fn test_distant_points_stay_apart() {
        let points = vec![point(37.77, -122.42, 2), point(52.52, 13.40, 3)];
        let clusters = cluster(&points, 2, &ClusterOptions::default());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].visitors, 3);
        assert_eq!(clusters[0].expansion_zoom, 2);
    }

    #[test]
    fn test_expansion_zoom_capped() {
        // 同一坐标永远不会分开
        let points = vec![point(10.0, 10.0, 1), point(10.0, 10.0, 1)];
        let opts = ClusterOptions::default();
        let clusters = cluster(&points, 5, &opts);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].expansion_zoom, opts.max_zoom);
    }

    #[test]
    fn test_points_without_coordinates_ignored() {
        let mut p = point(0.0, 0.0, 1);
        p.latitude = None;
        assert!(cluster(&[p], 4, &ClusterOptions::default()).is_empty());
    }
}
