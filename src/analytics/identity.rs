//! 访客 / 会话 ID 推导
//!
//! 访客 ID 优先级：
//! 1. `lm_vid` Cookie（原样复用）
//! 2. 边缘节点请求 ID 的 SHA-256，截取前 16 字节格式化为 UUID
//! 3. `ip|user-agent` 的 SHA-256，同样格式化为 UUID
//! 4. 随机 UUID v4
//!
//! 会话 ID 只复用 `lm_sid` Cookie 或随机生成，不做哈希。

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// 访客 Cookie 有效期（天）
pub const VISITOR_COOKIE_MAX_AGE_DAYS: i64 = 365;
/// 会话 Cookie 有效期（小时），每次访问都会续期
pub const SESSION_COOKIE_MAX_AGE_HOURS: i64 = 4;

/// 访客 ID 的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorIdSource {
    Cookie,
    Edge,
    IpUserAgent,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorId {
    pub id: String,
    pub source: VisitorIdSource,
}

impl VisitorId {
    /// 不是从 Cookie 读到的 ID 需要回写 Cookie
    pub fn needs_cookie(&self) -> bool {
        self.source != VisitorIdSource::Cookie
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    pub is_new: bool,
}

/// 推导访客 ID 所需的请求信号
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySignals<'a> {
    pub visitor_cookie: Option<&'a str>,
    pub edge_id: Option<&'a str>,
    pub client_ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// SHA-256 后取前 16 字节，按 UUID 格式输出
pub fn hash_to_uuid(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).hyphenated().to_string()
}

pub fn derive_visitor_id(signals: &IdentitySignals<'_>) -> VisitorId {
    if let Some(cookie) = non_blank(signals.visitor_cookie) {
        return VisitorId {
            id: cookie.to_string(),
            source: VisitorIdSource::Cookie,
        };
    }

    if let Some(edge_id) = non_blank(signals.edge_id) {
        return VisitorId {
            id: hash_to_uuid(edge_id),
            source: VisitorIdSource::Edge,
        };
    }

    if let (Some(ip), Some(ua)) = (non_blank(signals.client_ip), non_blank(signals.user_agent)) {
        return VisitorId {
            id: hash_to_uuid(&format!("{}|{}", ip, ua)),
            source: VisitorIdSource::IpUserAgent,
        };
    }

    VisitorId {
        id: Uuid::new_v4().to_string(),
        source: VisitorIdSource::Random,
    }
}

pub fn derive_session_id(session_cookie: Option<&str>) -> SessionId {
    match non_blank(session_cookie) {
        Some(id) => SessionId {
            id: id.to_string(),
            is_new: false,
        },
        None => SessionId {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_is_reused_verbatim() {
        let signals = IdentitySignals {
            visitor_cookie: Some("not-even-a-uuid"),
            edge_id: Some("abc123"),
            client_ip: Some("1.2.3.4"),
            user_agent: Some("Mozilla/5.0"),
        };
        let vid = derive_visitor_id(&signals);
        assert_eq!(vid.id, "not-even-a-uuid");
        assert_eq!(vid.source, VisitorIdSource::Cookie);
        assert!(!vid.needs_cookie());
    }

    #[test]
    fn test_edge_id_is_deterministic() {
        let signals = IdentitySignals {
            edge_id: Some("abc123"),
            ..Default::default()
        };
        let first = derive_visitor_id(&signals);
        let second = derive_visitor_id(&signals);
        assert_eq!(first, second);
        assert_eq!(first.source, VisitorIdSource::Edge);
        assert!(Uuid::parse_str(&first.id).is_ok());
        assert_eq!(first.id, hash_to_uuid("abc123"));
    }

    #[test]
    fn test_edge_id_wins_over_ip_ua() {
        let with_edge = derive_visitor_id(&IdentitySignals {
            edge_id: Some("abc123"),
            client_ip: Some("1.2.3.4"),
            user_agent: Some("Mozilla/5.0"),
            ..Default::default()
        });
        assert_eq!(with_edge.id, hash_to_uuid("abc123"));
    }

    #[test]
    fn test_ip_ua_fallback() {
        let signals = IdentitySignals {
            client_ip: Some("1.2.3.4"),
            user_agent: Some("Mozilla/5.0"),
            ..Default::default()
        };
        let vid = derive_visitor_id(&signals);
        assert_eq!(vid.source, VisitorIdSource::IpUserAgent);
        assert_eq!(vid.id, hash_to_uuid("1.2.3.4|Mozilla/5.0"));

        let other_ua = derive_visitor_id(&IdentitySignals {
            user_agent: Some("curl"),
            ..signals
        });
        assert_ne!(vid.id, other_ua.id);
    }

    #[test]
    fn test_random_when_no_signal() {
        let a = derive_visitor_id(&IdentitySignals {
            visitor_cookie: Some("   "),
            client_ip: Some("1.2.3.4"),
            ..Default::default()
        });
        let b = derive_visitor_id(&IdentitySignals::default());
        assert_eq!(a.source, VisitorIdSource::Random);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_session_reuse_and_generate() {
        let reused = derive_session_id(Some("sess-1"));
        assert_eq!(reused.id, "sess-1");
        assert!(!reused.is_new);

        let fresh = derive_session_id(None);
        assert!(fresh.is_new);
        assert!(Uuid::parse_str(&fresh.id).is_ok());
    }

    #[test]
    fn test_hash_shape() {
        let id = hash_to_uuid("anything");
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }
}
