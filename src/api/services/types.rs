//! API 类型定义

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::error_code::ErrorCode;
use crate::analytics::GeoCluster;
use crate::analytics::aggregate::GeoPoint;
use crate::api::signed_cookie::AccessRole;

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../web/src/lib/api.generated.ts";

/// 错误响应体
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub error: String,
}

/// `{"ok": true}`
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct OkBody {
    pub ok: bool,
}

impl OkBody {
    pub const OK: OkBody = OkBody { ok: true };
}

/// 采集被跳过时的响应体
#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SkippedBody {
    pub skipped: bool,
    pub reason: crate::analytics::SkipReason,
}

#[derive(Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginResponse {
    pub ok: bool,
    pub role: AccessRole,
    pub email: String,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: i64,
    pub email: String,
    pub role: AccessRole,
    /// Unix 秒
    pub expires_at: i64,
}

/// 统计查询参数
#[derive(Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct StatsQuery {
    pub range: Option<String>,
    pub agg: Option<String>,
    pub zoom: Option<String>,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoResponse {
    pub range: crate::analytics::StatsRange,
    pub points: Vec<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<GeoCluster>>,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesResponse {
    pub range: crate::analytics::StatsRange,
    pub agg: crate::analytics::Aggregation,
    pub timezone: String,
    pub points: Vec<crate::analytics::TimeseriesPoint>,
}

#[derive(Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
}

#[derive(Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct SetThemeRequest {
    pub theme_id: String,
}

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SetupResponse {
    pub ok: bool,
    pub email: String,
}
