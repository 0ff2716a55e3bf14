//! API 帮助函数

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, error::InternalError, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::analytics::identity::{SESSION_COOKIE_MAX_AGE_HOURS, VISITOR_COOKIE_MAX_AGE_DAYS};
use crate::api::constants;
use crate::api::signed_cookie::{AuthClaims, get_cookie_signer};
use crate::errors::SiteError;

use super::error_code::ErrorCode;
use super::types::{ErrorBody, OkBody};

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        code,
        error: message.into(),
    })
}

/// 从 SiteError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 5xx 错误在这里统一记录日志
pub fn error_from_site(err: &SiteError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("{} [{}]: {}", err.error_type(), err.code(), err.message());
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<SiteError>,
{
    match result {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => error_from_site(&e.into()),
    }
}

/// 写操作成功时返回 `{"ok": true}`
pub fn ok_result<E: Into<SiteError>>(result: Result<(), E>) -> HttpResponse {
    api_result(result.map(|_| OkBody::OK))
}

/// JSON 请求体解析失败时也返回统一的错误体
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| {
            let message = err.to_string();
            debug!("Rejected JSON body: {}", message);
            let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
            InternalError::from_response(err, response).into()
        })
}

/// 当前请求的登录态
///
/// AdminGuard 已验证过的直接取 extensions，否则读取并验证 `auth` Cookie
pub fn current_claims(req: &HttpRequest) -> Option<AuthClaims> {
    if let Some(claims) = req.extensions().get::<AuthClaims>() {
        return Some(claims.clone());
    }
    let cookie = req.cookie(constants::AUTH_COOKIE_NAME)?;
    get_cookie_signer()
        .verify(cookie.value())
        .map_err(|e| debug!("Ignoring auth cookie: {}", e))
        .ok()
}

/// Cookie 构建器
pub struct CookieBuilder {
    secure: bool,
}

impl CookieBuilder {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self::new(config.cookie_secure())
    }

    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn build_cookie_base(
        &self,
        name: &'static str,
        value: String,
        http_only: bool,
        max_age: CookieDuration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path("/");
        cookie.set_http_only(http_only);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        cookie
    }

    pub fn build_auth_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::AUTH_COOKIE_NAME,
            token,
            true,
            CookieDuration::days(constants::AUTH_COOKIE_MAX_AGE_DAYS),
        )
    }

    pub fn build_expired_auth_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(
            constants::AUTH_COOKIE_NAME,
            String::new(),
            true,
            CookieDuration::ZERO,
        )
    }

    pub fn build_visitor_cookie(&self, visitor_id: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::VISITOR_COOKIE_NAME,
            visitor_id,
            true,
            CookieDuration::days(VISITOR_COOKIE_MAX_AGE_DAYS),
        )
    }

    /// 每次记录访问都重新下发，滑动 4 小时的会话窗口
    pub fn build_session_cookie(&self, session_id: String) -> Cookie<'static> {
        self.build_cookie_base(
            constants::SESSION_COOKIE_NAME,
            session_id,
            true,
            CookieDuration::hours(SESSION_COOKIE_MAX_AGE_HOURS),
        )
    }
}
