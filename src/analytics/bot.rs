//! 爬虫 / 自动化客户端识别

use std::sync::OnceLock;

use woothee::parser::Parser;

/// woothee 未覆盖的 UA 关键字（小写匹配）
const BOT_KEYWORDS: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "slurp",
    "headless",
    "lighthouse",
    "preview",
    "monitor",
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "axios",
    "node-fetch",
    "undici",
    "go-http-client",
    "okhttp",
    "java/",
    "libwww",
    "httpclient",
    "facebookexternalhit",
    "embedly",
    "quora link preview",
    "whatsapp",
    "vercel-screenshot",
];

static PARSER: OnceLock<Parser> = OnceLock::new();

fn parser() -> &'static Parser {
    PARSER.get_or_init(Parser::new)
}

/// 缺失或空 UA 也视为机器流量
pub fn is_bot(user_agent: Option<&str>) -> bool {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return true;
    };

    if parser().parse(ua).is_some_and(|r| r.category == "crawler") {
        return true;
    }

    let lowered = ua.to_ascii_lowercase();
    BOT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
