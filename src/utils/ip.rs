//! IP / Host 处理工具
//!
//! - 可信代理（IP 或 CIDR）判断
//! - 客户端真实 IP 提取
//! - 本地开发 Host 识别

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 检查 IP 是否为私有地址、回环或 link-local
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            // fc00::/7 ULA, fe80::/10 link-local
            v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

/// 解析 `ip` 或 `ip:port`
fn parse_ip_lenient(raw: &str) -> Option<IpAddr> {
    raw.parse::<SocketAddr>()
        .map(|sa| sa.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .ok()
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip_addr) = parse_ip_lenient(ip) else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let (Ok(prefix_len), Ok(network_addr)) = (prefix_len.parse::<u32>(), network.parse::<IpAddr>())
    else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 从请求头提取转发的 IP（X-Forwarded-For 第一个，其次 X-Real-IP）
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

/// 提取真实客户端 IP
///
/// 1. 显式配置了 trusted_proxies：只有来自可信代理的连接才读取转发头
/// 2. 未配置：连接来自私有地址时视为反向代理后，读取转发头
/// 3. 其他情况使用连接 IP
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    let conn_info = req.connection_info();
    let Some(peer) = conn_info.peer_addr() else {
        return extract_forwarded_ip_from_headers(req.headers());
    };
    let peer = parse_ip_lenient(peer)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| peer.to_string());

    let trust_forwarded = if trusted_proxies.is_empty() {
        peer.parse::<IpAddr>()
            .is_ok_and(|ip| is_private_or_local(&ip))
    } else {
        is_trusted_proxy(&peer, trusted_proxies)
    };

    if trust_forwarded && let Some(real_ip) = extract_forwarded_ip_from_headers(req.headers()) {
        debug!("Client IP via proxy {}: {}", peer, real_ip);
        return Some(real_ip);
    }
    Some(peer)
}

/// 是否为本地开发 Host（忽略端口）
pub fn is_local_host(host: &str) -> bool {
    let host = host.trim().to_ascii_lowercase();
    let hostname = if let Some(rest) = host.strip_prefix('[') {
        // [::1]:8080
        rest.split(']').next().unwrap_or(rest).to_string()
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(&host).to_string()
    } else {
        host.clone()
    };

    matches!(
        hostname.as_str(),
        "localhost" | "127.0.0.1" | "::1" | "0.0.0.0"
    ) || hostname.ends_with(".localhost")
        || hostname.ends_with(".local")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_private_or_local() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));

        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&v6, "2001:db8::/32"));
        assert!(!ip_in_cidr(&v6, "192.168.0.0/16"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec!["127.0.0.1".to_string(), "10.1.0.0/16".to_string()];
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("10.1.2.3", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("not-an-ip", &proxies));
    }

    #[test]
    fn test_is_local_host() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("localhost:3000"));
        assert!(is_local_host("127.0.0.1:8080"));
        assert!(is_local_host("[::1]:8080"));
        assert!(is_local_host("mac-mini.local"));
        assert!(is_local_host("app.localhost"));
        assert!(!is_local_host("example.com"));
        assert!(!is_local_host("localhost.example.com"));
    }

    #[test]
    fn test_forwarded_header_order() {
        let mut headers = HeaderMap::new();
        headers.insert(
            actix_web::http::header::HeaderName::from_static("x-real-ip"),
            "9.9.9.9".parse().unwrap(),
        );
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers).as_deref(),
            Some("9.9.9.9")
        );
        headers.insert(
            actix_web::http::header::HeaderName::from_static("x-forwarded-for"),
            "1.2.3.4, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers).as_deref(),
            Some("1.2.3.4")
        );
    }
}
