//! API 模块常量定义
//!
//! Cookie 名称、有效期与固定路径。

/// 登录态 Cookie 名称
pub const AUTH_COOKIE_NAME: &str = "auth";

/// 登录态有效期（天）
pub const AUTH_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// 访客 ID Cookie 名称
pub const VISITOR_COOKIE_NAME: &str = "lm_vid";

/// 会话 ID Cookie 名称
pub const SESSION_COOKIE_NAME: &str = "lm_sid";

/// 管理员登录端点，不经过 AdminGuard
pub const ADMIN_LOGIN_PATH: &str = "/api/admin/auth";
