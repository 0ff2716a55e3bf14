use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::signed_cookie::init_cookie_signer;
use crate::config::get_config;
use crate::services::{
    AnalyticsService, AuthService, CollectorService, ContentService, GeoResolver, ThemeService,
};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub analytics_service: Arc<AnalyticsService>,
    pub collector_service: Arc<CollectorService>,
    pub content_service: Arc<ContentService>,
    pub auth_service: Arc<AuthService>,
    pub theme_service: Arc<ThemeService>,
}

/// 准备服务器启动的上下文
/// 包括存储、签名密钥和各业务 service
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let config = get_config();

    init_cookie_signer(&config).map_err(|e| anyhow::anyhow!(e.format_simple()))?;
    if config.auth.secret.is_empty() {
        warn!("auth.secret is empty; sessions will not survive a restart");
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| anyhow::anyhow!(e.format_simple()))
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let geo = Arc::new(GeoResolver::new(&config.analytics, config.is_production()));
    let analytics_service = Arc::new(AnalyticsService::new(storage.clone(), &config.analytics));
    let collector_service = Arc::new(CollectorService::new(
        storage.clone(),
        geo,
        &config.analytics.admin_prefix,
    ));
    let content_service = Arc::new(ContentService::new(storage.clone()));
    let auth_service = Arc::new(AuthService::new(storage.clone()));
    let theme_service = Arc::new(ThemeService::new(storage.clone()));

    match auth_service.has_admin().await {
        Ok(false) => warn!("No admin account yet: POST /api/setup or run `lmsite user create`"),
        Ok(true) => {}
        Err(e) => warn!("Failed to check admin accounts: {}", e),
    }

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        analytics_service,
        collector_service,
        content_service,
        auth_service,
        theme_service,
    })
}
