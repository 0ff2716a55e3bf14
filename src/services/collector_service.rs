//! Page-view ingestion
//!
//! 线性过滤链，命中第一条规则即返回跳过原因：
//! DNT → bot → 管理后台路径 → 登录态 → 本地 Host → 私有作品 → 地理位置 → 写入

use std::sync::Arc;

use actix_web::HttpRequest;
use tracing::debug;

use crate::analytics::collector::{
    self, CollectOutcome, CollectRequest, PathKind, SkipReason, classify_path,
};
use crate::analytics::identity::{IdentitySignals, derive_session_id, derive_visitor_id};
use crate::analytics::{bot, source};
use crate::api::constants::{SESSION_COOKIE_NAME, VISITOR_COOKIE_NAME};
use crate::api::services::helpers::current_claims;
use crate::api::signed_cookie::{AccessRole, AuthClaims};
use crate::config::StaticConfig;
use crate::errors::Result;
use crate::services::geoip::{GeoHeaders, GeoResolver};
use crate::storage::{ContentScope, NewPageView, SeaOrmStorage};
use crate::utils::ip::{extract_client_ip, is_local_host};

/// 过滤链需要的请求信息
#[derive(Debug, Clone, Default)]
pub struct CollectContext {
    pub dnt: bool,
    pub user_agent: Option<String>,
    pub host: Option<String>,
    pub referer: Option<String>,
    pub visitor_cookie: Option<String>,
    pub session_cookie: Option<String>,
    pub edge_id: Option<String>,
    pub client_ip: Option<String>,
    /// 已验签的登录态
    pub auth: Option<AuthClaims>,
    pub geo_headers: GeoHeaders,
}

impl CollectContext {
    pub fn from_request(req: &HttpRequest, config: &StaticConfig) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let cookie = |name: &str| {
            req.cookie(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            dnt: header("dnt").as_deref() == Some("1"),
            user_agent: header("user-agent"),
            host: header("x-forwarded-host").or_else(|| header("host")),
            referer: header("referer"),
            visitor_cookie: cookie(VISITOR_COOKIE_NAME),
            session_cookie: cookie(SESSION_COOKIE_NAME),
            edge_id: header(&config.analytics.edge_id_header),
            client_ip: extract_client_ip(req, &config.auth.trusted_proxies),
            auth: current_claims(req),
            geo_headers: GeoHeaders::from_request(req, &config.analytics.geo_headers),
        }
    }
}

pub struct CollectorService {
    storage: Arc<SeaOrmStorage>,
    geo: Arc<GeoResolver>,
    admin_prefix: String,
}

impl CollectorService {
    pub fn new(storage: Arc<SeaOrmStorage>, geo: Arc<GeoResolver>, admin_prefix: &str) -> Self {
        Self {
            storage,
            geo,
            admin_prefix: admin_prefix.to_string(),
        }
    }

    /// 私有作品返回 None；公开作品的短路径改写为完整路径
    async fn normalize_path(&self, path: String) -> Result<Option<String>> {
        match classify_path(&path) {
            PathKind::SelectedWork(slug) => {
                let work = self
                    .storage
                    .find_selected_work_by_slug(slug, ContentScope::Admin)
                    .await?;
                if work.is_some_and(|w| w.is_private) {
                    return Ok(None);
                }
                Ok(Some(path))
            }
            PathKind::BareSlug(slug) => {
                match self
                    .storage
                    .find_selected_work_by_slug(slug, ContentScope::Admin)
                    .await?
                {
                    Some(work) if work.is_private => Ok(None),
                    Some(work) => Ok(Some(collector::selected_work_path(&work.slug))),
                    None => Ok(Some(path)),
                }
            }
            PathKind::Other => Ok(Some(path)),
        }
    }

    pub async fn collect(&self, ctx: &CollectContext, req: &CollectRequest) -> Result<CollectOutcome> {
        let path = req.validated_path()?;

        if ctx.dnt {
            return Ok(CollectOutcome::Skipped(SkipReason::Dnt));
        }
        if bot::is_bot(ctx.user_agent.as_deref()) {
            return Ok(CollectOutcome::Skipped(SkipReason::Bot));
        }
        if collector::is_admin_path(&path, &self.admin_prefix) {
            return Ok(CollectOutcome::Skipped(SkipReason::Admin));
        }

        let private_user_id = ctx.auth.as_ref().map(|claims| claims.sub);

        if private_user_id.is_none() && ctx.host.as_deref().is_some_and(is_local_host) {
            return Ok(CollectOutcome::Skipped(SkipReason::Localhost));
        }

        let Some(path) = self.normalize_path(path).await? else {
            return Ok(CollectOutcome::Skipped(SkipReason::Private));
        };

        let geo = self
            .geo
            .resolve(&ctx.geo_headers, ctx.client_ip.as_deref())
            .await;

        let visitor = derive_visitor_id(&IdentitySignals {
            visitor_cookie: ctx.visitor_cookie.as_deref(),
            edge_id: ctx.edge_id.as_deref(),
            client_ip: ctx.client_ip.as_deref(),
            user_agent: ctx.user_agent.as_deref(),
        });
        let session = derive_session_id(ctx.session_cookie.as_deref());

        let utm = source::parse_utm(req.current_url.as_deref());
        let role = ctx.auth.as_ref().map(|c| c.role);

        let row = NewPageView {
            path: path.clone(),
            referrer_domain: source::referrer_domain(ctx.referer.as_deref(), ctx.host.as_deref()),
            utm_source: utm.source,
            utm_medium: utm.medium,
            utm_campaign: utm.campaign,
            utm_term: utm.term,
            utm_content: utm.content,
            visitor_id: visitor.id.clone(),
            session_id: session.id.clone(),
            country: geo.country,
            region: geo.region,
            city: geo.city,
            latitude: geo.latitude,
            longitude: geo.longitude,
            is_bot: false,
            is_admin: req.is_admin.unwrap_or(false) || role == Some(AccessRole::Admin),
            is_private: req.is_private.unwrap_or(false) || role == Some(AccessRole::Private),
            private_user_id,
            created_at: None,
        };
        self.storage.insert_page_view(row).await?;

        debug!(
            "Page view collected: path={} visitor={:?} new_session={}",
            path, visitor.source, session.is_new
        );
        Ok(CollectOutcome::Recorded {
            new_visitor: visitor.needs_cookie(),
            visitor_id: visitor.id,
            session_id: session.id,
        })
    }
}
