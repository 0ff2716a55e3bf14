//! 读取模型：实体 Model → API 响应结构
//!
//! 实体定义在 migration crate 中，不带 serde；这里统一做一次转换。

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use migration::entities::{
    field_note, guestbook_entry, howdy_content, selected_work, work_company, work_position,
};

use crate::api::services::types::TS_EXPORT_PATH;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct FieldNote {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub published: bool,
    pub is_private: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<field_note::Model> for FieldNote {
    fn from(m: field_note::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            title: m.title,
            summary: m.summary,
            body: m.body,
            published: m.published,
            is_private: m.is_private,
            display_order: m.display_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWork {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub cover_url: Option<String>,
    pub link_url: Option<String>,
    pub published: bool,
    pub is_private: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<selected_work::Model> for SelectedWork {
    fn from(m: selected_work::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            title: m.title,
            summary: m.summary,
            body: m.body,
            cover_url: m.cover_url,
            link_url: m.link_url,
            published: m.published,
            is_private: m.is_private,
            display_order: m.display_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub website: Option<String>,
    pub published: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<guestbook_entry::Model> for GuestbookEntry {
    fn from(m: guestbook_entry::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            message: m.message,
            website: m.website,
            published: m.published,
            display_order: m.display_order,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct WorkPosition {
    pub id: i64,
    pub company_id: i64,
    pub title: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub display_order: i32,
}

impl From<work_position::Model> for WorkPosition {
    fn from(m: work_position::Model) -> Self {
        Self {
            id: m.id,
            company_id: m.company_id,
            title: m.title,
            start_date: m.start_date,
            end_date: m.end_date,
            description: m.description,
            display_order: m.display_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct WorkCompany {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub display_order: i32,
}

impl From<work_company::Model> for WorkCompany {
    fn from(m: work_company::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            url: m.url,
            logo_url: m.logo_url,
            display_order: m.display_order,
        }
    }
}

/// `GET /api/work-history` 的元素：公司及其职位
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHistory {
    #[serde(flatten)]
    #[ts(flatten)]
    pub company: WorkCompany,
    pub positions: Vec<WorkPosition>,
}

impl From<(work_company::Model, Vec<work_position::Model>)> for CompanyHistory {
    fn from((company, positions): (work_company::Model, Vec<work_position::Model>)) -> Self {
        Self {
            company: company.into(),
            positions: positions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Howdy {
    pub headline: String,
    pub body: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<howdy_content::Model>> for Howdy {
    /// 尚未编辑过时返回空内容而不是 404
    fn from(m: Option<howdy_content::Model>) -> Self {
        match m {
            Some(m) => Self {
                headline: m.headline,
                body: m.body,
                updated_at: Some(m.updated_at),
            },
            None => Self {
                headline: String::new(),
                body: String::new(),
                updated_at: None,
            },
        }
    }
}
