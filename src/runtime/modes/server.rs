//! Server mode
//!
//! 启动 HTTP 服务并挂载全部路由。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::helpers::json_config;
use crate::api::services::{AppStartTime, api_routes, health_routes};
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// This function:
/// 1. Records startup time
/// 2. Prepares server components (storage, services)
/// 3. Configures and starts the HTTP server
/// 4. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage = startup.storage.clone();
    let analytics_service = startup.analytics_service.clone();
    let collector_service = startup.collector_service.clone();
    let content_service = startup.content_service.clone();
    let auth_service = startup.auth_service.clone();
    let theme_service = startup.theme_service.clone();

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    if config.auth.trusted_proxies.is_empty() {
        warn!(
            "No trusted proxies configured; X-Forwarded-For is ignored \
             and the peer address is used as client IP"
        );
    } else {
        warn!(
            "Trusted proxies configured: {:?}",
            config.auth.trusted_proxies
        );
    }

    let storage_for_shutdown = storage.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(collector_service.clone()))
            .app_data(web::Data::new(content_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(theme_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(json_config())
            .app_data(web::PayloadConfig::new(256 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(api_routes())
            .service(health_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&storage_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
