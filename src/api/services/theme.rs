//! 管理端主题切换

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Serialize;
use ts_rs::TS;

use crate::services::{ThemeDefinition, ThemeId, ThemeRegistry, ThemeService};

use super::helpers::{api_result, error_from_site};
use super::types::{SetThemeRequest, TS_EXPORT_PATH};

#[derive(Serialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ThemesResponse {
    pub active: ThemeId,
    pub themes: Vec<&'static ThemeDefinition>,
}

/// `GET /api/admin/themes`
pub async fn list_themes(themes: web::Data<Arc<ThemeService>>) -> HttpResponse {
    api_result(themes.active().await.map(|active| ThemesResponse {
        active: active.id,
        themes: ThemeRegistry::all(),
    }))
}

/// `PUT /api/admin/themes/active`，未知主题返回 400
pub async fn set_active_theme(
    body: web::Json<SetThemeRequest>,
    themes: web::Data<Arc<ThemeService>>,
) -> HttpResponse {
    let id = match ThemeRegistry::parse(&body.theme_id) {
        Ok(id) => id,
        Err(e) => return error_from_site(&e),
    };
    api_result(themes.set_active(id).await)
}

pub fn theme_routes() -> actix_web::Scope {
    web::scope("/themes")
        .route("", web::get().to(list_themes))
        .route("/active", web::put().to(set_active_theme))
}
