//! 认证端点：登录、退出、查询当前登录态

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, error};

use crate::api::signed_cookie::get_cookie_signer;
use crate::config::get_config;
use crate::errors::SiteError;
use crate::services::AuthService;
use crate::utils::ip::is_trusted_proxy;

use super::error_code::ErrorCode;
use super::helpers::{CookieBuilder, current_claims, error_from_site, error_response};
use super::types::{LoginCredentials, LoginResponse, OkBody, SessionResponse};

/// 登录限流的 key：连接 IP，来自可信代理时使用转发的真实 IP
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();
        let peer_ip = conn_info
            .peer_addr()
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))?;

        let config = get_config();
        let trusted_proxies = &config.auth.trusted_proxies;
        if !trusted_proxies.is_empty() && is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = conn_info.realip_remote_addr().unwrap_or(peer_ip);
            debug!("Login rate limit key from trusted proxy: {}", real_ip);
            Ok(real_ip.to_string())
        } else {
            Ok(peer_ip.to_string())
        }
    }
}

/// 登录限流：每秒补充 1 个令牌，突发 5 次，超限返回 429
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// `POST /api/admin/auth`
pub async fn login(
    credentials: web::Json<LoginCredentials>,
    auth: web::Data<Arc<AuthService>>,
) -> HttpResponse {
    let claims = match auth.login(&credentials.email, &credentials.password).await {
        Ok(c) => c,
        Err(SiteError::Unauthorized(msg)) => {
            return error_response(StatusCode::UNAUTHORIZED, ErrorCode::AuthFailed, msg);
        }
        Err(e) => return error_from_site(&e),
    };

    let token = match get_cookie_signer().sign(&claims) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to sign auth cookie: {}", e);
            return error_from_site(&e);
        }
    };

    HttpResponse::Ok()
        .cookie(CookieBuilder::from_config().build_auth_cookie(token))
        .json(LoginResponse {
            ok: true,
            role: claims.role,
            email: claims.email,
        })
}

/// `POST /api/auth/sign-out`
pub async fn sign_out() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(CookieBuilder::from_config().build_expired_auth_cookie())
        .json(OkBody::OK)
}

/// `GET /api/auth/session`
pub async fn session(req: HttpRequest) -> HttpResponse {
    match current_claims(&req) {
        Some(claims) => HttpResponse::Ok().json(SessionResponse {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            expires_at: claims.exp,
        }),
        None => error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, "Not signed in"),
    }
}

pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/sign-out", web::post().to(sign_out))
        .route("/session", web::get().to(session))
}
