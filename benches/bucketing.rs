//! 统计聚合性能基准测试

use std::hint::black_box;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use lmsite::analytics::aggregate::{geo_points, summarize, top_pages};
use lmsite::analytics::bucket::{build_buckets, bucketize};
use lmsite::analytics::cluster::cluster;
use lmsite::analytics::{Aggregation, ClusterOptions, ViewRecord};

const PATHS: [&str; 6] = [
    "/",
    "/field-notes",
    "/field-notes/hello-world",
    "/selected-works",
    "/guestbook",
    "/howdy",
];

const CITIES: [(&str, f64, f64); 4] = [
    ("Seattle", 47.6062, -122.3321),
    ("Portland", 45.5152, -122.6784),
    ("Berlin", 52.52, 13.405),
    ("Tokyo", 35.6762, 139.6503),
];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
}

/// 生成覆盖过去 30 天的访问记录
fn records(count: usize) -> Vec<ViewRecord> {
    let now = now();
    (0..count)
        .map(|i| {
            let (city, lat, lon) = CITIES[i % CITIES.len()];
            let jitter = (i % 50) as f64 * 0.01;
            ViewRecord {
                path: PATHS[i % PATHS.len()].to_string(),
                visitor_id: format!("visitor-{}", i % 97),
                country: Some("US".to_string()),
                region: None,
                city: Some(city.to_string()),
                latitude: Some(lat + jitter),
                longitude: Some(lon - jitter),
                created_at: now - Duration::minutes((i as i64 * 37) % (30 * 24 * 60)),
            }
        })
        .collect()
}

// ============== 时区分桶 ==============

fn bench_build_buckets(c: &mut Criterion) {
    let now = now();
    let mut group = c.benchmark_group("buckets/build");

    for (name, agg, days) in [
        ("hour_24h", Aggregation::Hour, 1),
        ("day_30d", Aggregation::Day, 30),
        ("week_1y", Aggregation::Week, 365),
        ("quarter_1y", Aggregation::Quarter, 365),
    ] {
        let start = now - Duration::days(days);
        group.bench_function(name, |b| {
            b.iter(|| build_buckets(black_box(start), black_box(now), agg, &Los_Angeles))
        });
    }
    group.finish();
}

fn bench_bucketize(c: &mut Criterion) {
    let now = now();
    let buckets = build_buckets(now - Duration::days(30), now, Aggregation::Day, &Los_Angeles);
    let mut group = c.benchmark_group("buckets/bucketize");

    for size in [1_000, 10_000, 50_000] {
        let rows = records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("rows", size), &rows, |b, rows| {
            b.iter(|| {
                bucketize(
                    &buckets,
                    Aggregation::Day,
                    &Los_Angeles,
                    rows.iter().map(|r| (r.created_at, r.visitor_id.as_str())),
                )
            })
        });
    }
    group.finish();
}

// ============== 汇总与排行 ==============

fn bench_aggregates(c: &mut Criterion) {
    let rows = records(10_000);

    c.bench_function("aggregate/summarize_10k", |b| {
        b.iter(|| summarize(black_box(&rows)))
    });
    c.bench_function("aggregate/top_pages_10k", |b| {
        b.iter(|| top_pages(black_box(&rows)))
    });
    c.bench_function("aggregate/geo_points_10k", |b| {
        b.iter(|| geo_points(black_box(&rows)))
    });
}

// ============== 地图聚类 ==============

fn bench_cluster(c: &mut Criterion) {
    let points = geo_points(&records(10_000));
    let opts = ClusterOptions::default();
    let mut group = c.benchmark_group("cluster");

    for zoom in [0u8, 4, 10] {
        group.bench_with_input(BenchmarkId::new("zoom", zoom), &zoom, |b, &zoom| {
            b.iter(|| cluster(black_box(&points), zoom, &opts))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_buckets,
    bench_bucketize,
    bench_aggregates,
    bench_cluster,
);
criterion_main!(benches);
