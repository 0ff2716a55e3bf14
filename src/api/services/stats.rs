//! `/api/admin/stats/*` 访问统计读取端点

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};

use crate::errors::SiteError;
use crate::services::AnalyticsService;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_site, error_response};
use super::types::{GeoResponse, StatsQuery, TimeseriesResponse};

/// 参数错误使用统计域的错误码
fn invalid_param(err: &SiteError) -> HttpResponse {
    match err {
        SiteError::Validation(msg) => {
            error_response(StatusCode::BAD_REQUEST, ErrorCode::AnalyticsInvalidRange, msg)
        }
        other => error_from_site(other),
    }
}

pub async fn summary(
    query: web::Query<StatsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    let range = match AnalyticsService::parse_range(query.range.as_deref()) {
        Ok(r) => r,
        Err(e) => return invalid_param(&e),
    };
    api_result(analytics.summary(range).await)
}

pub async fn top_pages(
    query: web::Query<StatsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    let range = match AnalyticsService::parse_range(query.range.as_deref()) {
        Ok(r) => r,
        Err(e) => return invalid_param(&e),
    };
    api_result(analytics.top_pages(range).await)
}

pub async fn geo(
    query: web::Query<StatsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    let params = AnalyticsService::parse_range(query.range.as_deref())
        .and_then(|range| Ok((range, analytics.parse_zoom(query.zoom.as_deref())?)));
    let (range, zoom) = match params {
        Ok(p) => p,
        Err(e) => return invalid_param(&e),
    };
    api_result(analytics.geo(range, zoom).await.map(|dist| GeoResponse {
        range,
        points: dist.points,
        clusters: dist.clusters,
    }))
}

pub async fn timeseries(
    query: web::Query<StatsQuery>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> HttpResponse {
    let range = match AnalyticsService::parse_range(query.range.as_deref()) {
        Ok(r) => r,
        Err(e) => return invalid_param(&e),
    };
    match analytics.timeseries(range, query.agg.as_deref()).await {
        Ok(series) => HttpResponse::Ok().json(TimeseriesResponse {
            range,
            agg: series.agg,
            timezone: analytics.timezone().name().to_string(),
            points: series.points,
        }),
        Err(e) => invalid_param(&e),
    }
}

pub fn stats_routes() -> actix_web::Scope {
    web::scope("/stats")
        .route("/summary", web::get().to(summary))
        .route("/top-pages", web::get().to(top_pages))
        .route("/geo", web::get().to(geo))
        .route("/timeseries", web::get().to(timeseries))
}
