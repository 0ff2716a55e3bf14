//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;
use crate::errors::SiteError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 内容错误
/// - 6000-6099: 访问统计错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    DatabaseError = 1006,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    RateLimitExceeded = 2004,
    SetupAlreadyDone = 2005,

    // 内容错误 3000-3099
    ContentValidation = 3000,
    RevalidateSecretInvalid = 3001,

    // 访问统计错误 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidRange = 6002,
}

impl From<&SiteError> for ErrorCode {
    fn from(err: &SiteError) -> Self {
        match err {
            SiteError::Validation(_) => ErrorCode::BadRequest,
            SiteError::Unauthorized(_) => ErrorCode::Unauthorized,
            SiteError::NotFound(_) => ErrorCode::NotFound,
            SiteError::DatabaseOperation(_) | SiteError::DatabaseConnection(_) => {
                ErrorCode::DatabaseError
            }
            SiteError::AnalyticsQueryFailed(_) => ErrorCode::AnalyticsQueryFailed,
            SiteError::Config(_)
            | SiteError::DatabaseConfig(_)
            | SiteError::FileOperation(_)
            | SiteError::Serialization(_)
            | SiteError::PasswordHash(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::BadRequest).unwrap(), "1000");
        assert_eq!(
            serde_json::to_string(&ErrorCode::AnalyticsInvalidRange).unwrap(),
            "6002"
        );
    }

    #[test]
    fn test_from_site_error() {
        assert_eq!(
            ErrorCode::from(&SiteError::validation("x")),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ErrorCode::from(&SiteError::database_operation("locked")),
            ErrorCode::DatabaseError
        );
    }
}
