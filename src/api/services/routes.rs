//! API 路由配置
//!
//! `/api` 下分三块：公开读取与采集、登录态、`/api/admin`（AdminGuard 保护）。

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web;

use crate::api::middleware::AdminGuard;

use super::auth::{auth_routes, login, login_rate_limiter};
use super::collect::collect;
use super::content::content_routes;
use super::public::public_routes;
use super::setup::{revalidate, setup};
use super::stats::stats_routes;
use super::theme::theme_routes;

/// 管理端路由 `/admin`
///
/// - POST /admin/auth - 登录（限流，免认证）
/// - /admin/stats/* - 访问统计
/// - /admin/themes - 主题
/// - /admin/{collection} - 内容 CRUD 与排序
pub fn admin_routes() -> actix_web::Scope<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    web::scope("/admin")
        .wrap(AdminGuard)
        .route(
            "/auth",
            web::post().to(login).wrap(login_rate_limiter()),
        )
        .service(stats_routes())
        .service(theme_routes())
        .configure(content_routes)
}

/// 全部 API 路由 `/api`
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/analytics/collect", web::post().to(collect))
        .route("/setup", web::post().to(setup))
        .route("/revalidate", web::post().to(revalidate))
        .service(auth_routes())
        .service(admin_routes())
        .configure(public_routes)
}
