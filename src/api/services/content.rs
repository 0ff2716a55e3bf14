//! 管理端内容 CRUD
//!
//! 每个集合：列表、详情、创建、更新、删除、排序。

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::services::{AuthService, ContentService};
use crate::storage::Collection;
use crate::storage::models::{
    CompanyInput, FieldNoteInput, GuestbookInput, HowdyInput, PositionInput, PrivateUserInput,
    ReorderRequest, SelectedWorkInput,
};

use super::helpers::{api_result, ok_result};

type Content = web::Data<Arc<ContentService>>;

async fn delete_in(content: &ContentService, collection: Collection, id: i64) -> HttpResponse {
    ok_result(content.delete(collection, id).await)
}

async fn reorder_in(
    content: &ContentService,
    collection: Collection,
    body: ReorderRequest,
) -> HttpResponse {
    ok_result(content.reorder(collection, &body.ids).await.map(|_| ()))
}

// ---------------------------------------------------------------
// Field notes
// ---------------------------------------------------------------

pub async fn list_field_notes(content: Content) -> HttpResponse {
    api_result(content.list_field_notes().await)
}

pub async fn get_field_note(path: web::Path<i64>, content: Content) -> HttpResponse {
    api_result(content.get_field_note(path.into_inner()).await)
}

pub async fn create_field_note(body: web::Json<FieldNoteInput>, content: Content) -> HttpResponse {
    api_result(content.create_field_note(body.into_inner()).await)
}

pub async fn update_field_note(
    path: web::Path<i64>,
    body: web::Json<FieldNoteInput>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .update_field_note(path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_field_note(path: web::Path<i64>, content: Content) -> HttpResponse {
    delete_in(&content, Collection::FieldNotes, path.into_inner()).await
}

pub async fn reorder_field_notes(body: web::Json<ReorderRequest>, content: Content) -> HttpResponse {
    reorder_in(&content, Collection::FieldNotes, body.into_inner()).await
}

// ---------------------------------------------------------------
// Selected works
// ---------------------------------------------------------------

pub async fn list_selected_works(content: Content) -> HttpResponse {
    api_result(content.list_selected_works().await)
}

pub async fn get_selected_work(path: web::Path<i64>, content: Content) -> HttpResponse {
    api_result(content.get_selected_work(path.into_inner()).await)
}

pub async fn create_selected_work(
    body: web::Json<SelectedWorkInput>,
    content: Content,
) -> HttpResponse {
    api_result(content.create_selected_work(body.into_inner()).await)
}

pub async fn update_selected_work(
    path: web::Path<i64>,
    body: web::Json<SelectedWorkInput>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .update_selected_work(path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_selected_work(path: web::Path<i64>, content: Content) -> HttpResponse {
    delete_in(&content, Collection::SelectedWorks, path.into_inner()).await
}

pub async fn reorder_selected_works(
    body: web::Json<ReorderRequest>,
    content: Content,
) -> HttpResponse {
    reorder_in(&content, Collection::SelectedWorks, body.into_inner()).await
}

// ---------------------------------------------------------------
// Guestbook
// ---------------------------------------------------------------

pub async fn list_guestbook(content: Content) -> HttpResponse {
    api_result(content.list_guestbook().await)
}

pub async fn get_guestbook_entry(path: web::Path<i64>, content: Content) -> HttpResponse {
    api_result(content.get_guestbook_entry(path.into_inner()).await)
}

pub async fn create_guestbook_entry(
    body: web::Json<GuestbookInput>,
    content: Content,
) -> HttpResponse {
    api_result(content.create_guestbook_entry(body.into_inner()).await)
}

pub async fn update_guestbook_entry(
    path: web::Path<i64>,
    body: web::Json<GuestbookInput>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .update_guestbook_entry(path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_guestbook_entry(path: web::Path<i64>, content: Content) -> HttpResponse {
    delete_in(&content, Collection::Guestbook, path.into_inner()).await
}

pub async fn reorder_guestbook(body: web::Json<ReorderRequest>, content: Content) -> HttpResponse {
    reorder_in(&content, Collection::Guestbook, body.into_inner()).await
}

// ---------------------------------------------------------------
// Work history
// ---------------------------------------------------------------

pub async fn list_companies(content: Content) -> HttpResponse {
    api_result(content.list_companies().await)
}

pub async fn get_company(path: web::Path<i64>, content: Content) -> HttpResponse {
    api_result(content.get_company(path.into_inner()).await)
}

pub async fn create_company(body: web::Json<CompanyInput>, content: Content) -> HttpResponse {
    api_result(content.create_company(body.into_inner()).await)
}

pub async fn update_company(
    path: web::Path<i64>,
    body: web::Json<CompanyInput>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .update_company(path.into_inner(), body.into_inner())
            .await,
    )
}

/// 同时删除该公司下的职位
pub async fn delete_company(path: web::Path<i64>, content: Content) -> HttpResponse {
    delete_in(&content, Collection::WorkCompanies, path.into_inner()).await
}

pub async fn reorder_companies(body: web::Json<ReorderRequest>, content: Content) -> HttpResponse {
    reorder_in(&content, Collection::WorkCompanies, body.into_inner()).await
}

pub async fn list_positions(content: Content) -> HttpResponse {
    api_result(content.list_positions().await)
}

pub async fn get_position(path: web::Path<i64>, content: Content) -> HttpResponse {
    api_result(content.get_position(path.into_inner()).await)
}

pub async fn create_position(body: web::Json<PositionInput>, content: Content) -> HttpResponse {
    api_result(content.create_position(body.into_inner()).await)
}

pub async fn update_position(
    path: web::Path<i64>,
    body: web::Json<PositionInput>,
    content: Content,
) -> HttpResponse {
    api_result(
        content
            .update_position(path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_position(path: web::Path<i64>, content: Content) -> HttpResponse {
    delete_in(&content, Collection::WorkPositions, path.into_inner()).await
}

pub async fn reorder_positions(body: web::Json<ReorderRequest>, content: Content) -> HttpResponse {
    reorder_in(&content, Collection::WorkPositions, body.into_inner()).await
}

// ---------------------------------------------------------------
// Howdy
// ---------------------------------------------------------------

pub async fn get_howdy(content: Content) -> HttpResponse {
    api_result(content.get_howdy().await)
}

pub async fn update_howdy(body: web::Json<HowdyInput>, content: Content) -> HttpResponse {
    api_result(content.update_howdy(body.into_inner()).await)
}

// ---------------------------------------------------------------
// Private users
// ---------------------------------------------------------------

type Auth = web::Data<Arc<AuthService>>;

pub async fn list_private_users(auth: Auth) -> HttpResponse {
    api_result(auth.list_private_users().await)
}

pub async fn get_private_user(path: web::Path<i64>, auth: Auth) -> HttpResponse {
    api_result(auth.get_private_user(path.into_inner()).await)
}

pub async fn create_private_user(body: web::Json<PrivateUserInput>, auth: Auth) -> HttpResponse {
    api_result(auth.create_private_user(body.into_inner()).await)
}

pub async fn update_private_user(
    path: web::Path<i64>,
    body: web::Json<PrivateUserInput>,
    auth: Auth,
) -> HttpResponse {
    api_result(
        auth.update_private_user(path.into_inner(), body.into_inner())
            .await,
    )
}

pub async fn delete_private_user(path: web::Path<i64>, auth: Auth) -> HttpResponse {
    ok_result(auth.delete_private_user(path.into_inner()).await)
}

/// 管理端内容路由，`/reorder` 必须在 `/{id}` 之前注册
pub fn content_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/field-notes")
            .route("", web::get().to(list_field_notes))
            .route("", web::post().to(create_field_note))
            .route("/reorder", web::put().to(reorder_field_notes))
            .route("/{id}", web::get().to(get_field_note))
            .route("/{id}", web::put().to(update_field_note))
            .route("/{id}", web::delete().to(delete_field_note)),
    )
    .service(
        web::scope("/selected-works")
            .route("", web::get().to(list_selected_works))
            .route("", web::post().to(create_selected_work))
            .route("/reorder", web::put().to(reorder_selected_works))
            .route("/{id}", web::get().to(get_selected_work))
            .route("/{id}", web::put().to(update_selected_work))
            .route("/{id}", web::delete().to(delete_selected_work)),
    )
    .service(
        web::scope("/guestbook")
            .route("", web::get().to(list_guestbook))
            .route("", web::post().to(create_guestbook_entry))
            .route("/reorder", web::put().to(reorder_guestbook))
            .route("/{id}", web::get().to(get_guestbook_entry))
            .route("/{id}", web::put().to(update_guestbook_entry))
            .route("/{id}", web::delete().to(delete_guestbook_entry)),
    )
    .service(
        web::scope("/work-companies")
            .route("", web::get().to(list_companies))
            .route("", web::post().to(create_company))
            .route("/reorder", web::put().to(reorder_companies))
            .route("/{id}", web::get().to(get_company))
            .route("/{id}", web::put().to(update_company))
            .route("/{id}", web::delete().to(delete_company)),
    )
    .service(
        web::scope("/work-positions")
            .route("", web::get().to(list_positions))
            .route("", web::post().to(create_position))
            .route("/reorder", web::put().to(reorder_positions))
            .route("/{id}", web::get().to(get_position))
            .route("/{id}", web::put().to(update_position))
            .route("/{id}", web::delete().to(delete_position)),
    )
    .service(
        web::scope("/private-users")
            .route("", web::get().to(list_private_users))
            .route("", web::post().to(create_private_user))
            .route("/{id}", web::get().to(get_private_user))
            .route("/{id}", web::put().to(update_private_user))
            .route("/{id}", web::delete().to(delete_private_user)),
    )
    .route("/howdy", web::get().to(get_howdy))
    .route("/howdy", web::put().to(update_howdy));
}
