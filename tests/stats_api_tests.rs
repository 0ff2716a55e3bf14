//! Admin stats API tests

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::Value;

use lmsite::analytics::StatsRange;
use lmsite::api::signed_cookie::AccessRole;
use lmsite::storage::NewPageView;

use common::{admin_cookie, auth_cookie, insert_view, test_env};

#[actix_rt::test]
async fn test_stats_require_admin() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::get()
        .uri("/api/admin/stats/summary")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1001);

    // 私密访客不是管理员
    let req = TestRequest::get()
        .uri("/api/admin/stats/summary")
        .cookie(auth_cookie(7, "friend@example.com", AccessRole::Private))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 伪造的 Cookie
    let mut forged = admin_cookie();
    forged.set_value(format!("{}x", forged.value()));
    let req = TestRequest::get()
        .uri("/api/admin/stats/summary")
        .cookie(forged)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_top_pages_ordered_with_home_label() {
    let env = test_env().await;
    for visitor in ["v1", "v2", "v1"] {
        insert_view(&env.storage, "/a", visitor).await;
    }
    insert_view(&env.storage, "/b", "v3").await;
    insert_view(&env.storage, "/", "v1").await;
    insert_view(&env.storage, "/", "v4").await;

    let app = test_app!(env);
    let req = TestRequest::get()
        .uri("/api/admin/stats/top-pages?range=24h")
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let pages: Value = test::read_body_json(resp).await;
    let pages = pages.as_array().unwrap();
    assert_eq!(pages.len(), 3);

    assert_eq!(pages[0]["path"], "/a");
    assert_eq!(pages[0]["views"], 3);
    assert_eq!(pages[0]["visitors"], 2);

    assert_eq!(pages[1]["path"], "/");
    assert_eq!(pages[1]["label"], "Home");
    assert_eq!(pages[1]["views"], 2);

    assert_eq!(pages[2]["path"], "/b");
    assert_eq!(pages[2]["views"], 1);
}

#[actix_rt::test]
async fn test_summary_counts() {
    let env = test_env().await;
    insert_view(&env.storage, "/a", "v1").await;
    insert_view(&env.storage, "/a", "v2").await;
    insert_view(&env.storage, "/b", "v1").await;

    let summary = env
        .analytics
        .summary(lmsite::analytics::StatsRange::Week)
        .await
        .unwrap();
    assert_eq!(summary.views, 3);
    assert_eq!(summary.unique_visitors, 2);
    assert_eq!(summary.top_page.as_deref(), Some("/a"));
    assert_eq!(summary.top_page_views, 2);
    // 上一个窗口为空
    assert_eq!(summary.views_change, 100);
}

#[actix_rt::test]
async fn test_invalid_range_rejected() {
    let env = test_env().await;
    let app = test_app!(env);

    let req = TestRequest::get()
        .uri("/api/admin/stats/summary?range=90d")
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 6002);

    let req = TestRequest::get()
        .uri("/api/admin/stats/geo?range=7d&zoom=99")
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_timeseries_reports_timezone() {
    let env = test_env().await;
    insert_view(&env.storage, "/a", "v1").await;

    let app = test_app!(env);
    let req = TestRequest::get()
        .uri("/api/admin/stats/timeseries?range=7d")
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["timezone"], "America/Los_Angeles");
    let points = body["points"].as_array().unwrap();
    assert!(!points.is_empty());
    let total: u64 = points.iter().map(|p| p["views"].as_u64().unwrap()).sum();
    assert_eq!(total, 1);
}

#[actix_rt::test]
async fn test_geo_groups_without_coordinates() {
    let env = test_env().await;
    insert_view(&env.storage, "/a", "v1").await;

    let app = test_app!(env);
    let req = TestRequest::get()
        .uri("/api/admin/stats/geo?range=24h")
        .cookie(admin_cookie())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["range"], "24h");
    assert!(body["points"].is_array());
}

fn located_view(path: &str, visitor_id: &str, created_at: DateTime<Utc>) -> NewPageView {
    NewPageView {
        path: path.to_string(),
        visitor_id: visitor_id.to_string(),
        session_id: format!("session-{}", visitor_id),
        country: Some("DE".to_string()),
        city: Some("Berlin".to_string()),
        latitude: Some(52.52),
        longitude: Some(13.405),
        created_at: Some(created_at),
        ..Default::default()
    }
}

async fn admin_get(env: &common::TestEnv, uri: &str) -> Value {
    let app = test_app!(env);
    let req = TestRequest::get().uri(uri).cookie(admin_cookie()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body_json(resp).await
}

#[actix_rt::test]
async fn test_flagged_views_excluded_from_reports() {
    let env = test_env().await;
    let recent = Utc::now() - Duration::minutes(5);

    let mut normal = located_view("/a", "v1", recent);
    normal.country = Some("US".to_string());
    normal.city = Some("Seattle".to_string());
    normal.latitude = Some(47.6062);
    normal.longitude = Some(-122.3321);
    env.storage.insert_page_view(normal).await.unwrap();

    let mut admin = located_view("/admin-only", "owner", recent);
    admin.is_admin = true;
    let mut private = located_view("/friends-only", "friend", recent);
    private.is_private = true;
    private.private_user_id = Some(7);
    let mut bot = located_view("/crawled", "crawler", recent);
    bot.is_bot = true;
    for view in [admin, private, bot] {
        env.storage.insert_page_view(view).await.unwrap();
    }
    // 行确实写进去了
    assert_eq!(env.storage.count_page_views().await.unwrap(), 4);

    let summary = env.analytics.summary(StatsRange::Day).await.unwrap();
    assert_eq!(summary.views, 1);
    assert_eq!(summary.unique_visitors, 1);
    assert_eq!(summary.countries, 1);
    assert_eq!(summary.top_page.as_deref(), Some("/a"));

    let pages = admin_get(&env, "/api/admin/stats/top-pages?range=24h").await;
    let pages = pages.as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["path"], "/a");

    let geo = admin_get(&env, "/api/admin/stats/geo?range=24h").await;
    let points = geo["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["country"], "US");
    assert_eq!(points[0]["views"], 1);

    let series = admin_get(&env, "/api/admin/stats/timeseries?range=24h").await;
    let total: u64 = series["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["views"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 1);
}

#[actix_rt::test]
async fn test_all_range_starts_at_earliest_counted_view() {
    let env = test_env().await;
    let now = Utc::now().trunc_subsecs(0);
    let old = now - Duration::days(90);

    env.storage
        .insert_page_view(located_view("/a", "v1", now - Duration::minutes(5)))
        .await
        .unwrap();
    env.storage
        .insert_page_view(located_view("/b", "v2", old))
        .await
        .unwrap();
    // 更早的管理员访问不能把 all 的起点往前拉
    let mut admin = located_view("/a", "owner", now - Duration::days(200));
    admin.is_admin = true;
    env.storage.insert_page_view(admin).await.unwrap();

    let all = env.analytics.summary(StatsRange::All).await.unwrap();
    assert_eq!(all.views, 2);
    assert_eq!(all.unique_visitors, 2);

    let month = env.analytics.summary(StatsRange::Month).await.unwrap();
    assert_eq!(month.views, 1);
    assert_eq!(month.top_page.as_deref(), Some("/a"));

    let series = env
        .analytics
        .timeseries(StatsRange::All, None)
        .await
        .unwrap();
    let first = series.points.first().unwrap();
    assert!(first.start <= old);
    assert!(first.start > now - Duration::days(150));
    let total: u64 = series.points.iter().map(|p| p.views).sum();
    assert_eq!(total, 2);
}
