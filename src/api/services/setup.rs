//! 一次性初始化与缓存重新验证

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::SiteError;
use crate::services::{AuthService, ContentService, ThemeService};

use super::error_code::ErrorCode;
use super::helpers::{error_from_site, error_response};
use super::types::{OkBody, RevalidateQuery, SetupResponse};

/// `POST /api/setup`
///
/// 用配置中的默认管理员账号初始化，并写入默认主题；已有管理员时返回 400
pub async fn setup(
    auth: web::Data<Arc<AuthService>>,
    themes: web::Data<Arc<ThemeService>>,
) -> HttpResponse {
    let config = get_config();
    let email = &config.auth.default_admin_email;
    let password = &config.auth.default_admin_password;

    match auth.has_admin().await {
        Ok(true) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::SetupAlreadyDone,
                "Setup has already been completed",
            );
        }
        Ok(false) => {}
        Err(e) => return error_from_site(&e),
    }

    let user = match auth.setup(email, password).await {
        Ok(u) => u,
        Err(e) => return error_from_site(&e),
    };
    if let Err(e) = themes.seed_default().await {
        return error_from_site(&e);
    }

    HttpResponse::Ok().json(SetupResponse {
        ok: true,
        email: user.email,
    })
}

fn secret_matches(expected: &str, provided: &str) -> bool {
    expected.len() == provided.len() && bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

/// `POST /api/revalidate?secret=`：清空公开内容缓存
pub async fn revalidate(
    query: web::Query<RevalidateQuery>,
    content: web::Data<Arc<ContentService>>,
) -> HttpResponse {
    let config = get_config();
    let expected = &config.auth.revalidate_secret;
    if expected.is_empty() {
        return error_from_site(&SiteError::not_found("Revalidation is disabled"));
    }

    let provided = query.secret.as_deref().unwrap_or_default();
    if !secret_matches(expected, provided) {
        warn!("Revalidation rejected: invalid secret");
        return error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::RevalidateSecretInvalid,
            "Invalid revalidation secret",
        );
    }

    content.invalidate().await;
    info!("Public content revalidated");
    HttpResponse::Ok().json(OkBody::OK)
}
