//! `POST /api/analytics/collect`

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, trace};

use crate::analytics::{CollectOutcome, CollectRequest};
use crate::config::get_config;
use crate::errors::SiteError;
use crate::services::{CollectContext, CollectorService};

use super::helpers::{CookieBuilder, error_from_site};
use super::types::{OkBody, SkippedBody};

/// 请求体按原始字节解析：sendBeacon 发送的 Content-Type 可能是 text/plain
fn parse_body(body: &[u8]) -> Result<CollectRequest, SiteError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CollectRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| SiteError::validation(format!("Invalid JSON body: {}", e)))
}

pub async fn collect(
    req: HttpRequest,
    body: web::Bytes,
    collector: web::Data<Arc<CollectorService>>,
) -> HttpResponse {
    let payload = match parse_body(&body) {
        Ok(p) => p,
        Err(e) => return error_from_site(&e),
    };

    let config = get_config();
    let ctx = CollectContext::from_request(&req, &config);

    match collector.collect(&ctx, &payload).await {
        Ok(CollectOutcome::Skipped(reason)) => {
            debug!("Page view skipped: {}", reason);
            HttpResponse::Ok().json(SkippedBody {
                skipped: true,
                reason,
            })
        }
        Ok(CollectOutcome::Recorded {
            visitor_id,
            new_visitor,
            session_id,
        }) => {
            let cookies = CookieBuilder::new(config.cookie_secure());
            let mut resp = HttpResponse::Ok();
            if new_visitor {
                trace!("Issuing visitor cookie");
                resp.cookie(cookies.build_visitor_cookie(visitor_id));
            }
            resp.cookie(cookies.build_session_cookie(session_id));
            resp.json(OkBody::OK)
        }
        Err(e) => error_from_site(&e),
    }
}
