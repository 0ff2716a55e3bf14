use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;
use crate::storage::SeaOrmStorage;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 运行秒数
    pub uptime: u64,
    pub response_time_ms: u32,
}

/// `GET /health`
///
/// 直接访问存储层，不经过业务 service；只 ping，不扫表
pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
    app_start_time: web::Data<AppStartTime>,
) -> HttpResponse {
    let start_time = Instant::now();
    trace!("Received health check request");

    let (database, error) =
        match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await {
            Ok(Ok(())) => ("healthy", None),
            Ok(Err(e)) => {
                error!("Database health check failed: {}", e);
                ("unhealthy", Some(e.message().to_string()))
            }
            Err(_) => {
                error!("Database health check timeout");
                ("unhealthy", Some("timeout".to_string()))
            }
        };

    let now = chrono::Utc::now();
    let healthy = error.is_none();
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: database.to_string(),
        backend: storage.backend_name().to_string(),
        error,
        uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
        response_time_ms: start_time.elapsed().as_millis() as u32,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
