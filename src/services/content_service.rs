//! Content service
//!
//! 管理端写入（校验 + 写库 + 失效公开缓存）与公开读取（moka 缓存 60 秒）。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{Result, SiteError};
use crate::storage::models::{
    CompanyInput, FieldNoteInput, GuestbookInput, GuestbookSubmission, HowdyInput, PositionInput,
    SelectedWorkInput,
};
use crate::storage::views::{
    CompanyHistory, FieldNote, GuestbookEntry, Howdy, SelectedWork, WorkCompany, WorkPosition,
};
use crate::storage::{Collection, ContentScope, SeaOrmStorage};

/// 公开列表缓存时间
pub const PUBLIC_CACHE_TTL_SECS: u64 = 60;

/// 公开缓存的键，私密内容对已登录访客可见，所以要区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PublicKey {
    FieldNotes { include_private: bool },
    SelectedWorks { include_private: bool },
    Guestbook,
    WorkHistory,
    Howdy,
}

pub struct ContentService {
    storage: Arc<SeaOrmStorage>,
    public_cache: Cache<PublicKey, Arc<serde_json::Value>>,
}

fn to_value<T: Serialize>(data: T) -> Result<Arc<serde_json::Value>> {
    Ok(Arc::new(serde_json::to_value(data)?))
}

impl ContentService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let public_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(PUBLIC_CACHE_TTL_SECS))
            .build();
        Self {
            storage,
            public_cache,
        }
    }

    /// 清空公开缓存（管理端写入、`/api/revalidate`）
    pub async fn invalidate(&self) {
        self.public_cache.invalidate_all();
        self.public_cache.run_pending_tasks().await;
        debug!("Public content cache invalidated");
    }

    async fn cached<F>(&self, key: PublicKey, load: F) -> Result<Arc<serde_json::Value>>
    where
        F: Future<Output = Result<Arc<serde_json::Value>>>,
    {
        self.public_cache
            .try_get_with(key, load)
            .await
            .map_err(|e: Arc<SiteError>| (*e).clone())
    }

    // ---------------------------------------------------------------
    // Public reads
    // ---------------------------------------------------------------

    pub async fn public_field_notes(&self, include_private: bool) -> Result<Arc<serde_json::Value>> {
        self.cached(PublicKey::FieldNotes { include_private }, async {
            let rows = self
                .storage
                .list_field_notes(ContentScope::Public { include_private })
                .await?;
            to_value(rows.into_iter().map(FieldNote::from).collect::<Vec<_>>())
        })
        .await
    }

    pub async fn public_field_note(&self, slug: &str, include_private: bool) -> Result<FieldNote> {
        self.storage
            .find_field_note_by_slug(slug, ContentScope::Public { include_private })
            .await?
            .map(FieldNote::from)
            .ok_or_else(|| SiteError::not_found(format!("field note '{}' not found", slug)))
    }

    pub async fn public_selected_works(
        &self,
        include_private: bool,
    ) -> Result<Arc<serde_json::Value>> {
        self.cached(PublicKey::SelectedWorks { include_private }, async {
            let rows = self
                .storage
                .list_selected_works(ContentScope::Public { include_private })
                .await?;
            to_value(rows.into_iter().map(SelectedWork::from).collect::<Vec<_>>())
        })
        .await
    }

    pub async fn public_selected_work(
        &self,
        slug: &str,
        include_private: bool,
    ) -> Result<SelectedWork> {
        self.storage
            .find_selected_work_by_slug(slug, ContentScope::Public { include_private })
            .await?
            .map(SelectedWork::from)
            .ok_or_else(|| SiteError::not_found(format!("selected work '{}' not found", slug)))
    }

    pub async fn public_guestbook(&self) -> Result<Arc<serde_json::Value>> {
        self.cached(PublicKey::Guestbook, async {
            let rows = self
                .storage
                .list_guestbook(ContentScope::Public {
                    include_private: false,
                })
                .await?;
            to_value(rows.into_iter().map(GuestbookEntry::from).collect::<Vec<_>>())
        })
        .await
    }

    pub async fn public_work_history(&self) -> Result<Arc<serde_json::Value>> {
        self.cached(PublicKey::WorkHistory, async {
            let rows = self.storage.list_work_history().await?;
            to_value(rows.into_iter().map(CompanyHistory::from).collect::<Vec<_>>())
        })
        .await
    }

    pub async fn public_howdy(&self) -> Result<Arc<serde_json::Value>> {
        self.cached(PublicKey::Howdy, async {
            to_value(Howdy::from(self.storage.get_howdy().await?))
        })
        .await
    }

    /// 访客留言，进入待审核状态，不影响公开缓存
    pub async fn submit_guestbook(&self, submission: GuestbookSubmission) -> Result<GuestbookEntry> {
        let input = GuestbookInput::from(submission);
        input.validate()?;
        let entry = self.storage.create_guestbook_entry(input).await?;
        info!("Guestbook entry {} submitted for moderation", entry.id);
        Ok(entry.into())
    }

    // ---------------------------------------------------------------
    // Admin: shared
    // ---------------------------------------------------------------

    pub async fn delete(&self, collection: Collection, id: i64) -> Result<()> {
        self.storage.delete_content(collection, id).await?;
        self.invalidate().await;
        Ok(())
    }

    pub async fn reorder(&self, collection: Collection, ids: &[i64]) -> Result<u64> {
        let updated = self.storage.reorder(collection, ids).await?;
        self.invalidate().await;
        Ok(updated)
    }

    // ---------------------------------------------------------------
    // Admin: field notes
    // ---------------------------------------------------------------

    pub async fn list_field_notes(&self) -> Result<Vec<FieldNote>> {
        let rows = self.storage.list_field_notes(ContentScope::Admin).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_field_note(&self, id: i64) -> Result<FieldNote> {
        Ok(self.storage.get_field_note(id).await?.into())
    }

    pub async fn create_field_note(&self, input: FieldNoteInput) -> Result<FieldNote> {
        input.validate()?;
        let row = self.storage.create_field_note(input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn update_field_note(&self, id: i64, input: FieldNoteInput) -> Result<FieldNote> {
        input.validate()?;
        let row = self.storage.update_field_note(id, input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    // ---------------------------------------------------------------
    // Admin: selected works
    // ---------------------------------------------------------------

    pub async fn list_selected_works(&self) -> Result<Vec<SelectedWork>> {
        let rows = self.storage.list_selected_works(ContentScope::Admin).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_selected_work(&self, id: i64) -> Result<SelectedWork> {
        Ok(self.storage.get_selected_work(id).await?.into())
    }

    pub async fn create_selected_work(&self, input: SelectedWorkInput) -> Result<SelectedWork> {
        input.validate()?;
        let row = self.storage.create_selected_work(input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn update_selected_work(
        &self,
        id: i64,
        input: SelectedWorkInput,
    ) -> Result<SelectedWork> {
        input.validate()?;
        let row = self.storage.update_selected_work(id, input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    // ---------------------------------------------------------------
    // Admin: guestbook
    // ---------------------------------------------------------------

    pub async fn list_guestbook(&self) -> Result<Vec<GuestbookEntry>> {
        let rows = self.storage.list_guestbook(ContentScope::Admin).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_guestbook_entry(&self, id: i64) -> Result<GuestbookEntry> {
        Ok(self.storage.get_guestbook_entry(id).await?.into())
    }

    pub async fn create_guestbook_entry(&self, input: GuestbookInput) -> Result<GuestbookEntry> {
        input.validate()?;
        let row = self.storage.create_guestbook_entry(input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn update_guestbook_entry(
        &self,
        id: i64,
        input: GuestbookInput,
    ) -> Result<GuestbookEntry> {
        input.validate()?;
        let row = self.storage.update_guestbook_entry(id, input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    // ---------------------------------------------------------------
    // Admin: work history
    // ---------------------------------------------------------------

    pub async fn list_companies(&self) -> Result<Vec<WorkCompany>> {
        let rows = self.storage.list_companies().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_company(&self, id: i64) -> Result<WorkCompany> {
        Ok(self.storage.get_company(id).await?.into())
    }

    pub async fn create_company(&self, input: CompanyInput) -> Result<WorkCompany> {
        input.validate()?;
        let row = self.storage.create_company(input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn update_company(&self, id: i64, input: CompanyInput) -> Result<WorkCompany> {
        input.validate()?;
        let row = self.storage.update_company(id, input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn list_positions(&self) -> Result<Vec<WorkPosition>> {
        let rows = self.storage.list_positions().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_position(&self, id: i64) -> Result<WorkPosition> {
        Ok(self.storage.get_position(id).await?.into())
    }

    pub async fn create_position(&self, input: PositionInput) -> Result<WorkPosition> {
        input.validate()?;
        let row = self.storage.create_position(input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    pub async fn update_position(&self, id: i64, input: PositionInput) -> Result<WorkPosition> {
        input.validate()?;
        let row = self.storage.update_position(id, input).await?;
        self.invalidate().await;
        Ok(row.into())
    }

    // ---------------------------------------------------------------
    // Admin: howdy
    // ---------------------------------------------------------------

    pub async fn get_howdy(&self) -> Result<Howdy> {
        Ok(Howdy::from(self.storage.get_howdy().await?))
    }

    pub async fn update_howdy(&self, input: HowdyInput) -> Result<Howdy> {
        input.validate()?;
        let row = self.storage.upsert_howdy(input).await?;
        self.invalidate().await;
        Ok(Howdy::from(Some(row)))
    }
}
