use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum SiteError {
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Serialization(String),
    PasswordHash(String),
    AnalyticsQueryFailed(String),
}

impl SiteError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SiteError::Config(_) => "E001",
            SiteError::DatabaseConfig(_) => "E002",
            SiteError::DatabaseConnection(_) => "E003",
            SiteError::DatabaseOperation(_) => "E004",
            SiteError::FileOperation(_) => "E005",
            SiteError::Validation(_) => "E006",
            SiteError::Unauthorized(_) => "E007",
            SiteError::NotFound(_) => "E008",
            SiteError::Serialization(_) => "E009",
            SiteError::PasswordHash(_) => "E010",
            SiteError::AnalyticsQueryFailed(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SiteError::Config(_) => "Configuration Error",
            SiteError::DatabaseConfig(_) => "Database Configuration Error",
            SiteError::DatabaseConnection(_) => "Database Connection Error",
            SiteError::DatabaseOperation(_) => "Database Operation Error",
            SiteError::FileOperation(_) => "File Operation Error",
            SiteError::Validation(_) => "Validation Error",
            SiteError::Unauthorized(_) => "Unauthorized",
            SiteError::NotFound(_) => "Resource Not Found",
            SiteError::Serialization(_) => "Serialization Error",
            SiteError::PasswordHash(_) => "Password Hash Error",
            SiteError::AnalyticsQueryFailed(_) => "Analytics Query Failed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SiteError::Config(msg)
            | SiteError::DatabaseConfig(msg)
            | SiteError::DatabaseConnection(msg)
            | SiteError::DatabaseOperation(msg)
            | SiteError::FileOperation(msg)
            | SiteError::Validation(msg)
            | SiteError::Unauthorized(msg)
            | SiteError::NotFound(msg)
            | SiteError::Serialization(msg)
            | SiteError::PasswordHash(msg)
            | SiteError::AnalyticsQueryFailed(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// 数据库错误统一 500，原始错误信息直接透传给调用方
    pub fn http_status(&self) -> StatusCode {
        match self {
            SiteError::Validation(_) => StatusCode::BAD_REQUEST,
            SiteError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SiteError {}

// 便捷的构造函数
impl SiteError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        SiteError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SiteError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SiteError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SiteError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SiteError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SiteError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        SiteError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SiteError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SiteError::Serialization(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        SiteError::PasswordHash(msg.into())
    }

    pub fn analytics_query_failed<T: Into<String>>(msg: T) -> Self {
        SiteError::AnalyticsQueryFailed(msg.into())
    }
}

impl From<sea_orm::DbErr> for SiteError {
    fn from(err: sea_orm::DbErr) -> Self {
        SiteError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SiteError {
    fn from(err: std::io::Error) -> Self {
        SiteError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        SiteError::Serialization(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for SiteError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        SiteError::PasswordHash(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
