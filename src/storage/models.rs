//! 写入模型：管理端提交的内容数据
//!
//! 处理器直接把 JSON 反序列化为这些结构，校验后交给存储层写入。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::errors::{Result, SiteError};

const MAX_SLUG_LEN: usize = 120;
const MAX_TITLE_LEN: usize = 200;
pub const MAX_GUESTBOOK_NAME_LEN: usize = 80;
pub const MAX_GUESTBOOK_MESSAGE_LEN: usize = 1000;

/// slug：小写字母、数字、连字符，不能以连字符开头或结尾
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(SiteError::validation(format!(
            "slug must be 1-{} characters",
            MAX_SLUG_LEN
        )));
    }
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') {
        return Err(SiteError::validation(format!(
            "Invalid slug '{}': use lowercase letters, digits and '-'",
            slug
        )));
    }
    Ok(())
}

fn require(field: &str, value: &str, max_len: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(SiteError::validation(format!("{} is required", field)));
    }
    if len > max_len {
        return Err(SiteError::validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// `YYYY-MM`
fn validate_month(field: &str, value: &str) -> Result<()> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| SiteError::validation(format!("{} must be YYYY-MM, got '{}'", field, value)))
}

fn validate_optional_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    match url::Url::parse(raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
        _ => Err(SiteError::validation(format!(
            "{} must be an http(s) URL",
            field
        ))),
    }
}

/// 空字符串视为未设置
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct FieldNoteInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub is_private: bool,
}

impl FieldNoteInput {
    pub fn validate(&self) -> Result<()> {
        validate_slug(&self.slug)?;
        require("title", &self.title, MAX_TITLE_LEN)
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWorkInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub is_private: bool,
}

impl SelectedWorkInput {
    pub fn validate(&self) -> Result<()> {
        validate_slug(&self.slug)?;
        require("title", &self.title, MAX_TITLE_LEN)?;
        validate_optional_url("coverUrl", self.cover_url.as_deref())?;
        validate_optional_url("linkUrl", self.link_url.as_deref())
    }
}

/// 管理端编辑留言
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookInput {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl GuestbookInput {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name, MAX_GUESTBOOK_NAME_LEN)?;
        require("message", &self.message, MAX_GUESTBOOK_MESSAGE_LEN)?;
        validate_optional_url("website", self.website.as_deref())
    }
}

/// 访客提交的留言，总是以未发布状态保存
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GuestbookSubmission {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl From<GuestbookSubmission> for GuestbookInput {
    fn from(s: GuestbookSubmission) -> Self {
        Self {
            name: s.name,
            message: s.message,
            website: s.website,
            published: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CompanyInput {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name, MAX_TITLE_LEN)?;
        validate_optional_url("url", self.url.as_deref())?;
        validate_optional_url("logoUrl", self.logo_url.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub company_id: i64,
    pub title: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PositionInput {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title, MAX_TITLE_LEN)?;
        validate_month("startDate", &self.start_date)?;
        if let Some(end) = self.end_date.as_deref().filter(|e| !e.is_empty()) {
            validate_month("endDate", end)?;
            // YYYY-MM 字典序与时间序一致
            if end < self.start_date.as_str() {
                return Err(SiteError::validation("endDate must not be before startDate"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HowdyInput {
    pub headline: String,
    #[serde(default)]
    pub body: String,
}

impl HowdyInput {
    pub fn validate(&self) -> Result<()> {
        require("headline", &self.headline, MAX_TITLE_LEN)
    }
}

/// 私密访客账号
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct PrivateUserInput {
    pub email: String,
    /// 创建时必填；更新时为空表示不修改
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl PrivateUserInput {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(' ') => {
            Ok(())
        }
        _ => Err(SiteError::validation(format!("Invalid email '{}'", email))),
    }
}

/// `PUT /api/admin/<collection>/reorder` 请求体
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ReorderRequest {
    pub ids: Vec<i64>,
}

/// 公开内容查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentScope {
    /// 管理端：全部行
    Admin,
    /// 公开：只含已发布行，`include_private` 为已登录的管理员/私密访客
    Public { include_private: bool },
}

/// 私密账号列表项，不含密码哈希
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<migration::entities::admin_user::Model> for UserSummary {
    fn from(m: migration::entities::admin_user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            role: m.role,
            display_name: m.display_name,
            created_at: m.created_at,
        }
    }
}
