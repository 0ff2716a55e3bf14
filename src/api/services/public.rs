//! 公开读取端点
//!
//! 只返回已发布内容；私密内容仅对已登录的管理员或私密访客可见。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};

use crate::errors::Result;
use crate::services::{ContentService, ThemeService};
use crate::storage::models::GuestbookSubmission;

use super::helpers::{api_result, current_claims, error_from_site};

type Content = web::Data<Arc<ContentService>>;

fn can_see_private(req: &HttpRequest) -> bool {
    current_claims(req).is_some()
}

fn cached_json(result: Result<Arc<serde_json::Value>>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value.as_ref()),
        Err(e) => error_from_site(&e),
    }
}

pub async fn field_notes(req: HttpRequest, content: Content) -> HttpResponse {
    cached_json(content.public_field_notes(can_see_private(&req)).await)
}

pub async fn field_note(req: HttpRequest, slug: web::Path<String>, content: Content) -> HttpResponse {
    api_result(
        content
            .public_field_note(&slug, can_see_private(&req))
            .await,
    )
}

pub async fn selected_works(req: HttpRequest, content: Content) -> HttpResponse {
    cached_json(content.public_selected_works(can_see_private(&req)).await)
}

pub async fn selected_work(
    req: HttpRequest,
    slug: web::Path<String>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .public_selected_work(&slug, can_see_private(&req))
            .await,
    )
}

pub async fn guestbook(content: Content) -> HttpResponse {
    cached_json(content.public_guestbook().await)
}

/// 访客留言，审核后才会公开
pub async fn submit_guestbook(
    body: web::Json<GuestbookSubmission>,
    content: Content,
) -> HttpResponse {
    match content.submit_guestbook(body.into_inner()).await {
        Ok(entry) => HttpResponse::build(StatusCode::CREATED).json(entry),
        Err(e) => error_from_site(&e),
    }
}

pub async fn work_history(content: Content) -> HttpResponse {
    cached_json(content.public_work_history().await)
}

pub async fn howdy(content: Content) -> HttpResponse {
    cached_json(content.public_howdy().await)
}

pub async fn theme(themes: web::Data<Arc<ThemeService>>) -> HttpResponse {
    api_result(themes.active().await)
}

pub fn public_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/field-notes", web::get().to(field_notes))
        .route("/field-notes/{slug}", web::get().to(field_note))
        .route("/selected-works", web::get().to(selected_works))
        .route("/selected-works/{slug}", web::get().to(selected_work))
        .route("/guestbook", web::get().to(guestbook))
        .route("/guestbook", web::post().to(submit_guestbook))
        .route("/work-history", web::get().to(work_history))
        .route("/howdy", web::get().to(howdy))
        .route("/theme", web::get().to(theme));
}
