//! Content CRUD, public visibility and theme tests

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

use lmsite::api::signed_cookie::AccessRole;
use lmsite::storage::models::ContentScope;

use common::{admin_cookie, auth_cookie, test_env};

fn note(slug: &str, published: bool, is_private: bool) -> Value {
    json!({
        "slug": slug,
        "title": format!("Note {}", slug),
        "summary": "short",
        "body": "body text",
        "published": published,
        "isPrivate": is_private,
    })
}

fn slugs(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|n| n["slug"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Field notes
// =============================================================================

#[actix_rt::test]
async fn test_public_field_notes_hide_drafts_and_private() {
    let env = test_env().await;
    let app = test_app!(env);

    for body in [
        note("hello-world", true, false),
        note("draft", false, false),
        note("friends-only", true, true),
    ] {
        let req = TestRequest::post()
            .uri("/api/admin/field-notes")
            .cookie(admin_cookie())
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slugs(&list), vec!["hello-world"]);

    // 私密访客可以看到私密内容，但草稿依然不可见
    let req = TestRequest::get()
        .uri("/api/field-notes")
        .cookie(auth_cookie(9, "friend@example.com", AccessRole::Private))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slugs(&list), vec!["hello-world", "friends-only"]);

    let req = TestRequest::get()
        .uri("/api/field-notes/friends-only")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = TestRequest::get()
        .uri("/api/field-notes/hello-world")
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["title"], "Note hello-world");
    assert_eq!(detail["isPrivate"], false);

    // 管理端列表包含全部
    let req = TestRequest::get()
        .uri("/api/admin/field-notes")
        .cookie(admin_cookie())
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[actix_rt::test]
async fn test_admin_update_invalidates_public_cache() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::post()
        .uri("/api/admin/field-notes")
        .cookie(admin_cookie())
        .set_json(note("cached", true, false))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().unwrap();

    // 预热缓存
    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["title"], "Note cached");

    let mut updated = note("cached", true, false);
    updated["title"] = json!("Renamed");
    let req = TestRequest::put()
        .uri(&format!("/api/admin/field-notes/{}", id))
        .cookie(admin_cookie())
        .set_json(updated)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["title"], "Renamed");

    let req = TestRequest::delete()
        .uri(&format!("/api/admin/field-notes/{}", id))
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_reorder_field_notes() {
    let env = test_env().await;
    let app = test_app!(env);

    let mut ids = Vec::new();
    for slug in ["first", "second", "third"] {
        let req = TestRequest::post()
            .uri("/api/admin/field-notes")
            .cookie(admin_cookie())
            .set_json(note(slug, true, false))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slugs(&list), vec!["first", "second", "third"]);

    let req = TestRequest::put()
        .uri("/api/admin/field-notes/reorder")
        .cookie(admin_cookie())
        .set_json(json!({ "ids": [ids[2], ids[0], ids[1]] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/field-notes").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slugs(&list), vec!["third", "first", "second"]);
}

#[actix_rt::test]
async fn test_duplicate_and_invalid_slug_rejected() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::post()
        .uri("/api/admin/selected-works")
        .cookie(admin_cookie())
        .set_json(note("portfolio", true, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/api/admin/selected-works")
        .cookie(admin_cookie())
        .set_json(note("portfolio", true, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::post()
        .uri("/api/admin/selected-works")
        .cookie(admin_cookie())
        .set_json(note("Not A Slug", true, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_content_admin_requires_cookie() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::post()
        .uri("/api/admin/field-notes")
        .set_json(note("sneaky", true, false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let rows = env
        .storage
        .list_field_notes(ContentScope::Admin)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

// =============================================================================
// Work history
// =============================================================================

#[actix_rt::test]
async fn test_work_history_shape_and_company_delete() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::post()
        .uri("/api/admin/work-companies")
        .cookie(admin_cookie())
        .set_json(json!({ "name": "Acme", "url": "https://acme.example" }))
        .to_request();
    let company: Value = test::call_and_read_body_json(&app, req).await;
    let company_id = company["id"].as_i64().unwrap();

    for (title, start, end) in [
        ("Engineer", "2019-03", Some("2021-06")),
        ("Staff Engineer", "2021-07", None),
    ] {
        let req = TestRequest::post()
            .uri("/api/admin/work-positions")
            .cookie(admin_cookie())
            .set_json(json!({
                "companyId": company_id,
                "title": title,
                "startDate": start,
                "endDate": end,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // 结束时间早于开始时间
    let req = TestRequest::post()
        .uri("/api/admin/work-positions")
        .cookie(admin_cookie())
        .set_json(json!({
            "companyId": company_id,
            "title": "Time traveller",
            "startDate": "2022-01",
            "endDate": "2020-01",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::get().uri("/api/work-history").to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    // 公司字段平铺，职位嵌套
    assert_eq!(history[0]["name"], "Acme");
    assert_eq!(history[0]["id"], company_id);
    let positions = history[0]["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0]["title"], "Engineer");
    assert_eq!(positions[1]["endDate"], Value::Null);

    let req = TestRequest::delete()
        .uri(&format!("/api/admin/work-companies/{}", company_id))
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/admin/work-positions")
        .cookie(admin_cookie())
        .to_request();
    let positions: Value = test::call_and_read_body_json(&app, req).await;
    assert!(positions.as_array().unwrap().is_empty());

    let req = TestRequest::get().uri("/api/work-history").to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert!(history.as_array().unwrap().is_empty());
}

// =============================================================================
// Howdy & guestbook
// =============================================================================

#[actix_rt::test]
async fn test_howdy_defaults_then_updates() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::get().uri("/api/howdy").to_request();
    let howdy: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(howdy["updatedAt"], Value::Null);

    let req = TestRequest::put()
        .uri("/api/admin/howdy")
        .cookie(admin_cookie())
        .set_json(json!({ "headline": "Howdy!", "body": "Welcome in." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/howdy").to_request();
    let howdy: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(howdy["headline"], "Howdy!");
    assert_eq!(howdy["body"], "Welcome in.");
    assert!(howdy["updatedAt"].is_string());
}

#[actix_rt::test]
async fn test_guestbook_submission_awaits_moderation() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::post()
        .uri("/api/guestbook")
        .set_json(json!({ "name": "Ada", "message": "Lovely site" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let entry: Value = test::read_body_json(resp).await;
    assert_eq!(entry["published"], false);
    let id = entry["id"].as_i64().unwrap();

    let req = TestRequest::get().uri("/api/guestbook").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert!(list.as_array().unwrap().is_empty());

    // 管理员审核通过
    let req = TestRequest::put()
        .uri(&format!("/api/admin/guestbook/{}", id))
        .cookie(admin_cookie())
        .set_json(json!({ "name": "Ada", "message": "Lovely site", "published": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/guestbook").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["name"], "Ada");

    let req = TestRequest::post()
        .uri("/api/guestbook")
        .set_json(json!({ "name": "", "message": "anonymous" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Themes
// =============================================================================

#[actix_rt::test]
async fn test_theme_switching() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::get().uri("/api/theme").to_request();
    let theme: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(theme["id"], "classic");

    let req = TestRequest::get()
        .uri("/api/admin/themes")
        .cookie(admin_cookie())
        .to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing["active"], "classic");
    assert_eq!(listing["themes"].as_array().unwrap().len(), 3);

    let req = TestRequest::put()
        .uri("/api/admin/themes/active")
        .cookie(admin_cookie())
        .set_json(json!({ "themeId": "terminal" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/theme").to_request();
    let theme: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(theme["id"], "terminal");

    let req = TestRequest::put()
        .uri("/api/admin/themes/active")
        .cookie(admin_cookie())
        .set_json(json!({ "themeId": "vaporwave" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
