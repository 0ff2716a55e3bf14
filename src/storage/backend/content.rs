//! 内容表读写：field notes、selected works、留言、工作经历、howdy、主题
//!
//! 排序字段统一为 `display_order`；新行排在末尾（max + 1）。
//! reorder 对每一行独立 UPDATE，不做冲突检测，后写入者覆盖。

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, Condition,
    ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Select,
};
use tracing::info;

use super::SeaOrmStorage;
use crate::errors::{Result, SiteError};
use crate::storage::models::{
    CompanyInput, ContentScope, FieldNoteInput, GuestbookInput, HowdyInput, PositionInput,
    SelectedWorkInput, blank_to_none,
};

use migration::entities::{
    field_note, guestbook_entry, howdy_content, selected_work, site_theme, work_company,
    work_position,
};

/// 单行表的固定主键
const SINGLETON_ID: i32 = 1;

/// 可排序的内容集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    FieldNotes,
    SelectedWorks,
    Guestbook,
    WorkCompanies,
    WorkPositions,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::FieldNotes => "field note",
            Collection::SelectedWorks => "selected work",
            Collection::Guestbook => "guestbook entry",
            Collection::WorkCompanies => "company",
            Collection::WorkPositions => "position",
        }
    }
}

async fn next_display_order<E, C>(db: &C, order_col: E::Column) -> Result<i32>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = E::find()
        .select_only()
        .column_as(order_col.max(), "max_order")
        .into_tuple()
        .one(db)
        .await?;
    Ok(max.flatten().map_or(0, |m| m + 1))
}

async fn reorder_rows<E, C>(db: &C, id_col: E::Column, order_col: E::Column, ids: &[i64]) -> Result<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut updated = 0;
    for (index, id) in ids.iter().enumerate() {
        let result = E::update_many()
            .col_expr(order_col, Expr::value(index as i32))
            .filter(id_col.eq(*id))
            .exec(db)
            .await?;
        updated += result.rows_affected;
    }
    Ok(updated)
}

async fn delete_row<E, C>(db: &C, id_col: E::Column, id: i64, what: &str) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let result = E::delete_many().filter(id_col.eq(id)).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(SiteError::not_found(format!("{} {} not found", what, id)));
    }
    Ok(())
}

fn not_found(collection: Collection, id: i64) -> SiteError {
    SiteError::not_found(format!("{} {} not found", collection.name(), id))
}

/// 公开查询的过滤条件
fn visibility<E>(
    query: Select<E>,
    scope: ContentScope,
    published: E::Column,
    is_private: Option<E::Column>,
) -> Select<E>
where
    E: EntityTrait,
{
    match scope {
        ContentScope::Admin => query,
        ContentScope::Public { include_private } => {
            let mut cond = Condition::all().add(published.eq(true));
            if let Some(col) = is_private
                && !include_private
            {
                cond = cond.add(col.eq(false));
            }
            query.filter(cond)
        }
    }
}

impl SeaOrmStorage {
    pub async fn reorder(&self, collection: Collection, ids: &[i64]) -> Result<u64> {
        let db = &self.db;
        let updated = match collection {
            Collection::FieldNotes => {
                reorder_rows::<field_note::Entity, _>(
                    db,
                    field_note::Column::Id,
                    field_note::Column::DisplayOrder,
                    ids,
                )
                .await?
            }
            Collection::SelectedWorks => {
                reorder_rows::<selected_work::Entity, _>(
                    db,
                    selected_work::Column::Id,
                    selected_work::Column::DisplayOrder,
                    ids,
                )
                .await?
            }
            Collection::Guestbook => {
                reorder_rows::<guestbook_entry::Entity, _>(
                    db,
                    guestbook_entry::Column::Id,
                    guestbook_entry::Column::DisplayOrder,
                    ids,
                )
                .await?
            }
            Collection::WorkCompanies => {
                reorder_rows::<work_company::Entity, _>(
                    db,
                    work_company::Column::Id,
                    work_company::Column::DisplayOrder,
                    ids,
                )
                .await?
            }
            Collection::WorkPositions => {
                reorder_rows::<work_position::Entity, _>(
                    db,
                    work_position::Column::Id,
                    work_position::Column::DisplayOrder,
                    ids,
                )
                .await?
            }
        };
        info!("Reordered {} {} rows", updated, collection.name());
        Ok(updated)
    }

    pub async fn delete_content(&self, collection: Collection, id: i64) -> Result<()> {
        let db = &self.db;
        let what = collection.name();
        match collection {
            Collection::FieldNotes => {
                delete_row::<field_note::Entity, _>(db, field_note::Column::Id, id, what).await?
            }
            Collection::SelectedWorks => {
                delete_row::<selected_work::Entity, _>(db, selected_work::Column::Id, id, what)
                    .await?
            }
            Collection::Guestbook => {
                delete_row::<guestbook_entry::Entity, _>(db, guestbook_entry::Column::Id, id, what)
                    .await?
            }
            Collection::WorkCompanies => {
                // 不依赖外键级联，所有后端行为一致
                work_position::Entity::delete_many()
                    .filter(work_position::Column::CompanyId.eq(id))
                    .exec(db)
                    .await?;
                delete_row::<work_company::Entity, _>(db, work_company::Column::Id, id, what)
                    .await?
            }
            Collection::WorkPositions => {
                delete_row::<work_position::Entity, _>(db, work_position::Column::Id, id, what)
                    .await?
            }
        }
        info!("Deleted {} {}", what, id);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Field notes
    // ---------------------------------------------------------------

    pub async fn list_field_notes(&self, scope: ContentScope) -> Result<Vec<field_note::Model>> {
        let query = visibility(
            field_note::Entity::find(),
            scope,
            field_note::Column::Published,
            Some(field_note::Column::IsPrivate),
        );
        Ok(query
            .order_by_asc(field_note::Column::DisplayOrder)
            .order_by_asc(field_note::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_field_note(&self, id: i64) -> Result<field_note::Model> {
        field_note::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(Collection::FieldNotes, id))
    }

    pub async fn find_field_note_by_slug(
        &self,
        slug: &str,
        scope: ContentScope,
    ) -> Result<Option<field_note::Model>> {
        let query = visibility(
            field_note::Entity::find().filter(field_note::Column::Slug.eq(slug)),
            scope,
            field_note::Column::Published,
            Some(field_note::Column::IsPrivate),
        );
        Ok(query.one(&self.db).await?)
    }

    async fn field_note_slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let mut query = field_note::Entity::find().filter(field_note::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(field_note::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    pub async fn create_field_note(&self, input: FieldNoteInput) -> Result<field_note::Model> {
        if self.field_note_slug_taken(&input.slug, None).await? {
            return Err(SiteError::validation(format!(
                "slug '{}' is already in use",
                input.slug
            )));
        }
        let order =
            next_display_order::<field_note::Entity, _>(&self.db, field_note::Column::DisplayOrder)
                .await?;
        let now = Utc::now();
        let model = field_note::ActiveModel {
            id: NotSet,
            slug: Set(input.slug),
            title: Set(input.title.trim().to_string()),
            summary: Set(blank_to_none(input.summary)),
            body: Set(input.body),
            published: Set(input.published),
            is_private: Set(input.is_private),
            display_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_field_note(
        &self,
        id: i64,
        input: FieldNoteInput,
    ) -> Result<field_note::Model> {
        let existing = self.get_field_note(id).await?;
        if self.field_note_slug_taken(&input.slug, Some(id)).await? {
            return Err(SiteError::validation(format!(
                "slug '{}' is already in use",
                input.slug
            )));
        }
        let mut model = existing.into_active_model();
        model.slug = Set(input.slug);
        model.title = Set(input.title.trim().to_string());
        model.summary = Set(blank_to_none(input.summary));
        model.body = Set(input.body);
        model.published = Set(input.published);
        model.is_private = Set(input.is_private);
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    // ---------------------------------------------------------------
    // Selected works
    // ---------------------------------------------------------------

    pub async fn list_selected_works(
        &self,
        scope: ContentScope,
    ) -> Result<Vec<selected_work::Model>> {
        let query = visibility(
            selected_work::Entity::find(),
            scope,
            selected_work::Column::Published,
            Some(selected_work::Column::IsPrivate),
        );
        Ok(query
            .order_by_asc(selected_work::Column::DisplayOrder)
            .order_by_asc(selected_work::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_selected_work(&self, id: i64) -> Result<selected_work::Model> {
        selected_work::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(Collection::SelectedWorks, id))
    }

    pub async fn find_selected_work_by_slug(
        &self,
        slug: &str,
        scope: ContentScope,
    ) -> Result<Option<selected_work::Model>> {
        let query = visibility(
            selected_work::Entity::find().filter(selected_work::Column::Slug.eq(slug)),
            scope,
            selected_work::Column::Published,
            Some(selected_work::Column::IsPrivate),
        );
        Ok(query.one(&self.db).await?)
    }

    async fn selected_work_slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let mut query = selected_work::Entity::find().filter(selected_work::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(selected_work::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    pub async fn create_selected_work(
        &self,
        input: SelectedWorkInput,
    ) -> Result<selected_work::Model> {
        if self.selected_work_slug_taken(&input.slug, None).await? {
            return Err(SiteError::validation(format!(
                "slug '{}' is already in use",
                input.slug
            )));
        }
        let order = next_display_order::<selected_work::Entity, _>(
            &self.db,
            selected_work::Column::DisplayOrder,
        )
        .await?;
        let now = Utc::now();
        let model = selected_work::ActiveModel {
            id: NotSet,
            slug: Set(input.slug),
            title: Set(input.title.trim().to_string()),
            summary: Set(blank_to_none(input.summary)),
            body: Set(input.body),
            cover_url: Set(blank_to_none(input.cover_url)),
            link_url: Set(blank_to_none(input.link_url)),
            published: Set(input.published),
            is_private: Set(input.is_private),
            display_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_selected_work(
        &self,
        id: i64,
        input: SelectedWorkInput,
    ) -> Result<selected_work::Model> {
        let existing = self.get_selected_work(id).await?;
        if self.selected_work_slug_taken(&input.slug, Some(id)).await? {
            return Err(SiteError::validation(format!(
                "slug '{}' is already in use",
                input.slug
            )));
        }
        let mut model = existing.into_active_model();
        model.slug = Set(input.slug);
        model.title = Set(input.title.trim().to_string());
        model.summary = Set(blank_to_none(input.summary));
        model.body = Set(input.body);
        model.cover_url = Set(blank_to_none(input.cover_url));
        model.link_url = Set(blank_to_none(input.link_url));
        model.published = Set(input.published);
        model.is_private = Set(input.is_private);
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    // ---------------------------------------------------------------
    // Guestbook
    // ---------------------------------------------------------------

    pub async fn list_guestbook(&self, scope: ContentScope) -> Result<Vec<guestbook_entry::Model>> {
        let query = visibility(
            guestbook_entry::Entity::find(),
            scope,
            guestbook_entry::Column::Published,
            None,
        );
        Ok(query
            .order_by_asc(guestbook_entry::Column::DisplayOrder)
            .order_by_desc(guestbook_entry::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_guestbook_entry(&self, id: i64) -> Result<guestbook_entry::Model> {
        guestbook_entry::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(Collection::Guestbook, id))
    }

    pub async fn create_guestbook_entry(
        &self,
        input: GuestbookInput,
    ) -> Result<guestbook_entry::Model> {
        let order = next_display_order::<guestbook_entry::Entity, _>(
            &self.db,
            guestbook_entry::Column::DisplayOrder,
        )
        .await?;
        let now = Utc::now();
        let model = guestbook_entry::ActiveModel {
            id: NotSet,
            name: Set(input.name.trim().to_string()),
            message: Set(input.message.trim().to_string()),
            website: Set(blank_to_none(input.website)),
            published: Set(input.published),
            display_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_guestbook_entry(
        &self,
        id: i64,
        input: GuestbookInput,
    ) -> Result<guestbook_entry::Model> {
        let mut model = self.get_guestbook_entry(id).await?.into_active_model();
        model.name = Set(input.name.trim().to_string());
        model.message = Set(input.message.trim().to_string());
        model.website = Set(blank_to_none(input.website));
        model.published = Set(input.published);
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    // ---------------------------------------------------------------
    // Work history
    // ---------------------------------------------------------------

    pub async fn list_companies(&self) -> Result<Vec<work_company::Model>> {
        Ok(work_company::Entity::find()
            .order_by_asc(work_company::Column::DisplayOrder)
            .order_by_asc(work_company::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// 公司及其职位，职位按 display_order 排序
    pub async fn list_work_history(
        &self,
    ) -> Result<Vec<(work_company::Model, Vec<work_position::Model>)>> {
        let companies = self.list_companies().await?;
        let mut positions = self.list_positions().await?;
        positions.sort_by_key(|p| (p.company_id, p.display_order, p.id));

        Ok(companies
            .into_iter()
            .map(|company| {
                let own: Vec<work_position::Model> = positions
                    .iter()
                    .filter(|p| p.company_id == company.id)
                    .cloned()
                    .collect();
                (company, own)
            })
            .collect())
    }

    pub async fn get_company(&self, id: i64) -> Result<work_company::Model> {
        work_company::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(Collection::WorkCompanies, id))
    }

    pub async fn create_company(&self, input: CompanyInput) -> Result<work_company::Model> {
        let order = next_display_order::<work_company::Entity, _>(
            &self.db,
            work_company::Column::DisplayOrder,
        )
        .await?;
        let now = Utc::now();
        let model = work_company::ActiveModel {
            id: NotSet,
            name: Set(input.name.trim().to_string()),
            url: Set(blank_to_none(input.url)),
            logo_url: Set(blank_to_none(input.logo_url)),
            display_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_company(
        &self,
        id: i64,
        input: CompanyInput,
    ) -> Result<work_company::Model> {
        let mut model = self.get_company(id).await?.into_active_model();
        model.name = Set(input.name.trim().to_string());
        model.url = Set(blank_to_none(input.url));
        model.logo_url = Set(blank_to_none(input.logo_url));
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn list_positions(&self) -> Result<Vec<work_position::Model>> {
        Ok(work_position::Entity::find()
            .order_by_asc(work_position::Column::DisplayOrder)
            .order_by_asc(work_position::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_position(&self, id: i64) -> Result<work_position::Model> {
        work_position::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| not_found(Collection::WorkPositions, id))
    }

    pub async fn create_position(&self, input: PositionInput) -> Result<work_position::Model> {
        // 公司不存在时返回 404，而不是外键错误
        self.get_company(input.company_id).await?;
        let order = next_display_order::<work_position::Entity, _>(
            &self.db,
            work_position::Column::DisplayOrder,
        )
        .await?;
        let now = Utc::now();
        let model = work_position::ActiveModel {
            id: NotSet,
            company_id: Set(input.company_id),
            title: Set(input.title.trim().to_string()),
            start_date: Set(input.start_date),
            end_date: Set(blank_to_none(input.end_date)),
            description: Set(blank_to_none(input.description)),
            display_order: Set(order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_position(
        &self,
        id: i64,
        input: PositionInput,
    ) -> Result<work_position::Model> {
        let existing = self.get_position(id).await?;
        if existing.company_id != input.company_id {
            self.get_company(input.company_id).await?;
        }
        let mut model = existing.into_active_model();
        model.company_id = Set(input.company_id);
        model.title = Set(input.title.trim().to_string());
        model.start_date = Set(input.start_date);
        model.end_date = Set(blank_to_none(input.end_date));
        model.description = Set(blank_to_none(input.description));
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    // ---------------------------------------------------------------
    // Singletons
    // ---------------------------------------------------------------

    pub async fn get_howdy(&self) -> Result<Option<howdy_content::Model>> {
        Ok(howdy_content::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await?)
    }

    pub async fn upsert_howdy(&self, input: HowdyInput) -> Result<howdy_content::Model> {
        let model = howdy_content::ActiveModel {
            id: Set(SINGLETON_ID),
            headline: Set(input.headline.trim().to_string()),
            body: Set(input.body),
            updated_at: Set(Utc::now()),
        };
        howdy_content::Entity::insert(model)
            .on_conflict(
                OnConflict::column(howdy_content::Column::Id)
                    .update_columns([
                        howdy_content::Column::Headline,
                        howdy_content::Column::Body,
                        howdy_content::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.get_howdy()
            .await?
            .ok_or_else(|| SiteError::database_operation("howdy content missing after upsert"))
    }

    pub async fn get_active_theme(&self) -> Result<Option<String>> {
        Ok(site_theme::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await?
            .map(|m| m.active_theme))
    }

    pub async fn set_active_theme(&self, theme_id: &str) -> Result<()> {
        let model = site_theme::ActiveModel {
            id: Set(SINGLETON_ID),
            active_theme: Set(theme_id.to_string()),
            updated_at: Set(Utc::now()),
        };
        site_theme::Entity::insert(model)
            .on_conflict(
                OnConflict::column(site_theme::Column::Id)
                    .update_columns([site_theme::Column::ActiveTheme, site_theme::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        info!("Active theme set to {}", theme_id);
        Ok(())
    }
}
