//! Shared setup for integration tests
//!
//! 每个测试使用独立的临时 SQLite 数据库；全局配置只初始化一次。

#![allow(dead_code)]

use std::sync::{Arc, Once};

use actix_web::cookie::Cookie;
use chrono::{Duration, Utc};
use tempfile::TempDir;

use lmsite::api::constants::AUTH_COOKIE_NAME;
use lmsite::api::signed_cookie::{AccessRole, AuthClaims, get_cookie_signer};
use lmsite::config::{DatabaseConfig, Environment, StaticConfig, set_config};
use lmsite::services::{
    AnalyticsService, AuthService, CollectorService, ContentService, GeoResolver, ThemeService,
};
use lmsite::storage::{NewPageView, SeaOrmStorage};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const REVALIDATE_SECRET: &str = "rv-test-secret";
pub const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        let mut config = StaticConfig::default();
        config.server.environment = Environment::Development;
        config.auth.secret = "integration-test-signing-secret".to_string();
        config.auth.default_admin_email = ADMIN_EMAIL.to_string();
        config.auth.default_admin_password = ADMIN_PASSWORD.to_string();
        config.auth.revalidate_secret = REVALIDATE_SECRET.to_string();
        config.analytics.mock_geo = false;
        config.analytics.enable_ip_lookup = false;
        set_config(config);
    });
}

pub struct TestEnv {
    _dir: TempDir,
    pub storage: Arc<SeaOrmStorage>,
    pub analytics: Arc<AnalyticsService>,
    pub collector: Arc<CollectorService>,
    pub content: Arc<ContentService>,
    pub auth: Arc<AuthService>,
    pub themes: Arc<ThemeService>,
}

pub async fn test_env() -> TestEnv {
    init_test_config();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("lmsite_test.db");
    let db_config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    let storage = Arc::new(
        SeaOrmStorage::new(&db_config)
            .await
            .expect("Failed to create storage"),
    );

    let config = lmsite::config::get_config();
    let geo = Arc::new(GeoResolver::with_provider(None, false));

    TestEnv {
        analytics: Arc::new(AnalyticsService::new(storage.clone(), &config.analytics)),
        collector: Arc::new(CollectorService::new(
            storage.clone(),
            geo,
            &config.analytics.admin_prefix,
        )),
        content: Arc::new(ContentService::new(storage.clone())),
        auth: Arc::new(AuthService::new(storage.clone())),
        themes: Arc::new(ThemeService::new(storage.clone())),
        storage,
        _dir: dir,
    }
}

/// 完整的 `/api` + `/health` 应用
#[macro_export]
macro_rules! test_app {
    ($env:expr) => {{
        let env = &$env;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(env.storage.clone()))
                .app_data(actix_web::web::Data::new(env.analytics.clone()))
                .app_data(actix_web::web::Data::new(env.collector.clone()))
                .app_data(actix_web::web::Data::new(env.content.clone()))
                .app_data(actix_web::web::Data::new(env.auth.clone()))
                .app_data(actix_web::web::Data::new(env.themes.clone()))
                .app_data(actix_web::web::Data::new(
                    lmsite::api::services::AppStartTime {
                        start_datetime: chrono::Utc::now(),
                    },
                ))
                .app_data(lmsite::api::services::helpers::json_config())
                .service(lmsite::api::services::api_routes())
                .service(lmsite::api::services::health_routes()),
        )
        .await
    }};
}

pub fn auth_cookie(user_id: i64, email: &str, role: AccessRole) -> Cookie<'static> {
    let token = get_cookie_signer()
        .sign(&AuthClaims::new(user_id, email, role))
        .expect("sign auth cookie");
    Cookie::new(AUTH_COOKIE_NAME, token)
}

pub fn admin_cookie() -> Cookie<'static> {
    auth_cookie(1, ADMIN_EMAIL, AccessRole::Admin)
}

/// 直接写入一条可统计的访问记录（五分钟前）
pub async fn insert_view(storage: &SeaOrmStorage, path: &str, visitor_id: &str) {
    storage
        .insert_page_view(NewPageView {
            path: path.to_string(),
            visitor_id: visitor_id.to_string(),
            session_id: format!("session-{}", visitor_id),
            created_at: Some(Utc::now() - Duration::minutes(5)),
            ..Default::default()
        })
        .await
        .expect("insert page view");
}
