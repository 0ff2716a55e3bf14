//! 访问采集请求与过滤结果
//!
//! 这里只放与存储无关的部分：请求体、跳过原因、路径分类。
//! 过滤链的编排见 `services::collector_service`。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::errors::{Result, SiteError};

/// 选集作品详情页前缀
pub const SELECTED_WORKS_PREFIX: &str = "/selected-works/";

/// `POST /api/analytics/collect` 请求体
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub current_url: Option<String>,
}

impl CollectRequest {
    /// path 必须存在、非空且以 `/` 开头
    pub fn validated_path(&self) -> Result<String> {
        let path = self
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SiteError::validation("path is required"))?;
        if !path.starts_with('/') {
            return Err(SiteError::validation("path must start with '/'"));
        }
        Ok(path.to_string())
    }
}

/// 跳过记录的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SkipReason {
    Dnt,
    Bot,
    Admin,
    Localhost,
    Private,
}

/// 过滤链的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    Recorded {
        visitor_id: String,
        /// 需要写回 `lm_vid`
        new_visitor: bool,
        session_id: String,
    },
    Skipped(SkipReason),
}

/// 路径分类，用于私有作品判定和短路径改写
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind<'a> {
    /// `/selected-works/<slug>`
    SelectedWork(&'a str),
    /// 单段路径 `/<slug>`，可能是作品的短链接
    BareSlug(&'a str),
    Other,
}

pub fn classify_path(path: &str) -> PathKind<'_> {
    let clean = path
        .split(['?', '#'])
        .next()
        .unwrap_or(path)
        .trim_end_matches('/');

    if let Some(rest) = clean.strip_prefix(SELECTED_WORKS_PREFIX) {
        if !rest.is_empty() && !rest.contains('/') {
            return PathKind::SelectedWork(rest);
        }
        return PathKind::Other;
    }

    match clean.strip_prefix('/') {
        Some(slug) if !slug.is_empty() && !slug.contains('/') => PathKind::BareSlug(slug),
        _ => PathKind::Other,
    }
}

/// 短路径改写后的完整作品路径
pub fn selected_work_path(slug: &str) -> String {
    format!("{}{}", SELECTED_WORKS_PREFIX, slug)
}

/// 路径是否位于管理后台前缀下
pub fn is_admin_path(path: &str, admin_prefix: &str) -> bool {
    let prefix = admin_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(['/', '?', '#']))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: Option<&str>) -> CollectRequest {
        CollectRequest {
            path: path.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_validated_path() {
        assert_eq!(request(Some("/notes")).validated_path().unwrap(), "/notes");
        assert!(request(None).validated_path().is_err());
        assert!(request(Some("  ")).validated_path().is_err());
        assert!(request(Some("notes")).validated_path().is_err());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: CollectRequest = serde_json::from_str(
            r#"{"path":"/","isAdmin":true,"currentUrl":"https://x.dev/?utm_source=hn"}"#,
        )
        .unwrap();
        assert_eq!(req.is_admin, Some(true));
        assert_eq!(req.current_url.as_deref(), Some("https://x.dev/?utm_source=hn"));
        assert_eq!(req.is_private, None);
    }

    #[test]
    fn test_classify_path() {
        assert_eq!(
            classify_path("/selected-works/atlas"),
            PathKind::SelectedWork("atlas")
        );
        assert_eq!(
            classify_path("/selected-works/atlas/"),
            PathKind::SelectedWork("atlas")
        );
        assert_eq!(classify_path("/atlas"), PathKind::BareSlug("atlas"));
        assert_eq!(classify_path("/atlas?ref=x"), PathKind::BareSlug("atlas"));
        assert_eq!(classify_path("/"), PathKind::Other);
        assert_eq!(classify_path("/field-notes/one"), PathKind::Other);
        assert_eq!(classify_path("/selected-works"), PathKind::BareSlug("selected-works"));
    }

    #[test]
    fn test_admin_path() {
        assert!(is_admin_path("/admin", "/admin"));
        assert!(is_admin_path("/admin/stats", "/admin"));
        assert!(!is_admin_path("/administrator", "/admin"));
        assert!(!is_admin_path("/notes", "/admin"));
    }

    #[test]
    fn test_skip_reason_serialization() {
        assert_eq!(serde_json::to_value(SkipReason::Dnt).unwrap(), "dnt");
        assert_eq!(SkipReason::Localhost.to_string(), "localhost");
    }
}
