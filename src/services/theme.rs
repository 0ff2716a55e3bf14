//! Theme registry
//!
//! 主题是静态定义：每个主题为站点各区域提供一个组件名，再加一个样式表。
//! 数据库只保存一行“当前主题”指针；未知 id 一律回退到 classic。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::{info, warn};
use ts_rs::TS;

use crate::api::services::types::TS_EXPORT_PATH;
use crate::errors::{Result, SiteError};
use crate::storage::SeaOrmStorage;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    EnumIter,
    TS,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Classic,
    Terminal,
    Paper,
}

/// 各页面区域使用的组件
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSlots {
    pub layout: &'static str,
    pub home: &'static str,
    pub field_notes: &'static str,
    pub selected_works: &'static str,
    pub work_history: &'static str,
    pub guestbook: &'static str,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDefinition {
    pub id: ThemeId,
    pub name: &'static str,
    pub stylesheet: &'static str,
    pub slots: ThemeSlots,
}

static CLASSIC: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Classic,
    name: "Classic",
    stylesheet: "/themes/classic.css",
    slots: ThemeSlots {
        layout: "classic/Layout",
        home: "classic/Home",
        field_notes: "classic/FieldNotes",
        selected_works: "classic/SelectedWorks",
        work_history: "classic/WorkHistory",
        guestbook: "classic/Guestbook",
    },
};

static TERMINAL: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Terminal,
    name: "Terminal",
    stylesheet: "/themes/terminal.css",
    slots: ThemeSlots {
        layout: "terminal/Shell",
        home: "terminal/Motd",
        field_notes: "terminal/FieldNotes",
        selected_works: "terminal/SelectedWorks",
        work_history: "terminal/WorkHistory",
        guestbook: "terminal/Guestbook",
    },
};

static PAPER: ThemeDefinition = ThemeDefinition {
    id: ThemeId::Paper,
    name: "Paper",
    stylesheet: "/themes/paper.css",
    slots: ThemeSlots {
        layout: "paper/Layout",
        home: "paper/Home",
        field_notes: "paper/FieldNotes",
        selected_works: "paper/SelectedWorks",
        work_history: "paper/WorkHistory",
        // paper 复用 classic 的留言板
        guestbook: "classic/Guestbook",
    },
};

pub struct ThemeRegistry;

impl ThemeRegistry {
    pub fn get(id: ThemeId) -> &'static ThemeDefinition {
        match id {
            ThemeId::Classic => &CLASSIC,
            ThemeId::Terminal => &TERMINAL,
            ThemeId::Paper => &PAPER,
        }
    }

    /// 按字符串查找，未知或为空时回退到默认主题
    pub fn resolve(id: Option<&str>) -> &'static ThemeDefinition {
        let parsed = id.and_then(|raw| raw.parse::<ThemeId>().ok());
        if parsed.is_none()
            && let Some(raw) = id
        {
            warn!("Unknown theme id '{}', falling back to {}", raw, ThemeId::default().as_ref());
        }
        Self::get(parsed.unwrap_or_default())
    }

    pub fn all() -> Vec<&'static ThemeDefinition> {
        ThemeId::iter().map(Self::get).collect()
    }

    pub fn parse(raw: &str) -> Result<ThemeId> {
        raw.trim()
            .parse::<ThemeId>()
            .map_err(|_| SiteError::validation(format!("Unknown theme '{}'", raw)))
    }
}

pub struct ThemeService {
    storage: Arc<SeaOrmStorage>,
}

impl ThemeService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn active(&self) -> Result<&'static ThemeDefinition> {
        let stored = self.storage.get_active_theme().await?;
        Ok(ThemeRegistry::resolve(stored.as_deref()))
    }

    pub async fn set_active(&self, id: ThemeId) -> Result<&'static ThemeDefinition> {
        self.storage.set_active_theme(id.as_ref()).await?;
        info!("Theme switched to {}", id.as_ref());
        Ok(ThemeRegistry::get(id))
    }

    /// 初始化时写入默认主题，已有记录时不覆盖
    pub async fn seed_default(&self) -> Result<()> {
        if self.storage.get_active_theme().await?.is_none() {
            self.storage
                .set_active_theme(ThemeId::default().as_ref())
                .await?;
        }
        Ok(())
    }
}
