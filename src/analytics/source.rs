//! 流量来源：Referer 域名与 UTM 参数

use url::Url;

/// UTM 参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl UtmParams {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// 去掉端口
fn bare_host(site_host: &str) -> &str {
    if site_host.starts_with('[') {
        return site_host;
    }
    site_host.split(':').next().unwrap_or(site_host)
}

/// 提取 Referer 的域名
///
/// 同站跳转、无法解析或非 http(s) 的 Referer 返回 None
pub fn referrer_domain(referer: Option<&str>, site_host: Option<&str>) -> Option<String> {
    let url = Url::parse(referer?.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let domain = normalize_host(url.host_str()?);
    if domain.is_empty() {
        return None;
    }

    if let Some(site) = site_host
        && normalize_host(bare_host(site)) == domain
    {
        return None;
    }
    Some(domain)
}

/// 从页面完整 URL 解析 UTM 参数
///
/// 参数值已百分号解码，空值忽略；同名参数取第一个
pub fn parse_utm(current_url: Option<&str>) -> UtmParams {
    let mut utm = UtmParams::default();
    let Some(raw) = current_url.map(str::trim).filter(|s| !s.is_empty()) else {
        return utm;
    };

    // 前端可能只传 path?query
    let parsed = Url::parse(raw).or_else(|_| Url::parse("http://placeholder.invalid")?.join(raw));
    let Ok(url) = parsed else {
        return utm;
    };

    for (key, value) in url.query_pairs() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let slot = match key.as_ref() {
            "utm_source" => &mut utm.source,
            "utm_medium" => &mut utm.medium,
            "utm_campaign" => &mut utm.campaign,
            "utm_term" => &mut utm.term,
            "utm_content" => &mut utm.content,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
    utm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referrer_domain_basic() {
        assert_eq!(
            referrer_domain(Some("https://www.Google.com/search?q=x"), None),
            Some("google.com".to_string())
        );
        assert_eq!(
            referrer_domain(Some("https://news.ycombinator.com/item?id=1"), Some("me.dev")),
            Some("news.ycombinator.com".to_string())
        );
    }

    #[test]
    fn test_referrer_domain_same_site() {
        assert_eq!(
            referrer_domain(Some("https://www.me.dev/field-notes"), Some("me.dev")),
            None
        );
        assert_eq!(
            referrer_domain(Some("http://localhost:3000/"), Some("localhost:3000")),
            None
        );
    }

    #[test]
    fn test_referrer_domain_invalid() {
        assert_eq!(referrer_domain(None, None), None);
        assert_eq!(referrer_domain(Some("not a url"), None), None);
        assert_eq!(referrer_domain(Some("android-app://com.slack/"), None), None);
    }

    #[test]
    fn test_parse_utm_full_url() {
        let utm = parse_utm(Some(
            "https://me.dev/?utm_source=newsletter&utm_medium=email&utm_campaign=spring%20launch&utm_term=",
        ));
        assert_eq!(utm.source.as_deref(), Some("newsletter"));
        assert_eq!(utm.medium.as_deref(), Some("email"));
        assert_eq!(utm.campaign.as_deref(), Some("spring launch"));
        assert_eq!(utm.term, None);
        assert_eq!(utm.content, None);
    }

    #[test]
    fn test_parse_utm_relative_and_missing() {
        let utm = parse_utm(Some("/field-notes?utm_source=x&utm_source=y"));
        assert_eq!(utm.source.as_deref(), Some("x"));
        assert!(parse_utm(None).is_empty());
        assert!(parse_utm(Some("https://me.dev/about")).is_empty());
    }
}
