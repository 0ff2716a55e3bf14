//! HMAC-SHA256 签名的登录态 Cookie
//!
//! 格式：`base64url(JSON { payload, signature })`
//! - payload：claims 的 JSON 字符串，签名针对这段原始字节
//! - signature：`base64url(HMAC-SHA256(secret, payload))`

use std::fmt;
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use strum::{AsRefStr, EnumString};
use subtle::ConstantTimeEq;
use tracing::warn;
use ts_rs::TS;

use crate::api::constants::AUTH_COOKIE_MAX_AGE_DAYS;
use crate::api::services::types::TS_EXPORT_PATH;
use crate::config::StaticConfig;
use crate::errors::SiteError;

type HmacSha256 = Hmac<Sha256>;

static COOKIE_SIGNER: OnceLock<CookieSigner> = OnceLock::new();

/// 获取全局签名器，首次调用时按全局配置初始化
pub fn get_cookie_signer() -> &'static CookieSigner {
    COOKIE_SIGNER.get_or_init(|| {
        let config = crate::config::get_config();
        CookieSigner::from_config(&config).unwrap_or_else(|e| {
            warn!("{}; using an ephemeral signing secret", e);
            CookieSigner::new(&ephemeral_secret())
        })
    })
}

/// 启动时显式初始化，production 缺少密钥时返回错误
pub fn init_cookie_signer(config: &StaticConfig) -> Result<(), SiteError> {
    let signer = CookieSigner::from_config(config)?;
    // 已初始化（例如测试中）时保留原实例
    let _ = COOKIE_SIGNER.set(signer);
    Ok(())
}

fn ephemeral_secret() -> String {
    URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>())
}

/// 登录角色
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, TS,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessRole {
    Admin,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// admin_users.id
    pub sub: i64,
    pub email: String,
    pub role: AccessRole,
    pub iat: i64,
    pub exp: i64,
}

impl AuthClaims {
    pub fn new(user_id: i64, email: &str, role: AccessRole) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(AUTH_COOKIE_MAX_AGE_DAYS)).timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccessRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    Malformed,
    BadSignature,
    Expired,
}

impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieError::Malformed => write!(f, "malformed auth cookie"),
            CookieError::BadSignature => write!(f, "auth cookie signature mismatch"),
            CookieError::Expired => write!(f, "auth cookie expired"),
        }
    }
}

impl std::error::Error for CookieError {}

#[derive(Serialize, Deserialize)]
struct Envelope {
    payload: String,
    signature: String,
}

pub struct CookieSigner {
    secret: Vec<u8>,
}

impl CookieSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// 读取 `auth.secret`
    ///
    /// production 下为空直接报错；development 下生成临时密钥（重启后登录态失效）
    pub fn from_config(config: &StaticConfig) -> Result<Self, SiteError> {
        let secret = config.auth.secret.trim();
        if !secret.is_empty() {
            return Ok(Self::new(secret));
        }
        if config.is_production() {
            return Err(SiteError::config(
                "auth.secret must be set in production (LM__AUTH__SECRET)",
            ));
        }
        warn!("auth.secret is empty, generated an ephemeral secret for development");
        Ok(Self::new(&ephemeral_secret()))
    }

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        // HMAC 接受任意长度的密钥
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    pub fn sign(&self, claims: &AuthClaims) -> Result<String, SiteError> {
        let payload = serde_json::to_string(claims)?;
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes()));
        let envelope = serde_json::to_vec(&Envelope { payload, signature })?;
        Ok(URL_SAFE_NO_PAD.encode(envelope))
    }

    pub fn verify(&self, token: &str) -> Result<AuthClaims, CookieError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .or_else(|_| STANDARD.decode(token.trim()))
            .map_err(|_| CookieError::Malformed)?;
        let envelope: Envelope =
            serde_json::from_slice(&raw).map_err(|_| CookieError::Malformed)?;
        let provided = URL_SAFE_NO_PAD
            .decode(&envelope.signature)
            .map_err(|_| CookieError::Malformed)?;

        let expected = self.mac(envelope.payload.as_bytes());
        let matches = if provided.len() == expected.len() {
            expected.ct_eq(&provided)
        } else {
            // 长度不同也执行一次等长比较，耗时与正常路径一致
            std::hint::black_box(expected.ct_eq(&expected));
            subtle::Choice::from(0)
        };
        if !bool::from(matches) {
            return Err(CookieError::BadSignature);
        }

        let claims: AuthClaims =
            serde_json::from_str(&envelope.payload).map_err(|_| CookieError::Malformed)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(CookieError::Expired);
        }
        Ok(claims)
    }
}
