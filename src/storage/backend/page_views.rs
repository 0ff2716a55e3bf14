//! page_views 读写

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, error};

use super::SeaOrmStorage;
use crate::analytics::ViewRecord;
use crate::analytics::range::Window;
use crate::errors::Result;

use migration::entities::page_view;

/// 待写入的访问记录
#[derive(Debug, Clone, Default)]
pub struct NewPageView {
    pub path: String,
    pub referrer_domain: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub visitor_id: String,
    pub session_id: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// 采集端会跳过 bot，只有导入或补录的数据才可能为 true
    pub is_bot: bool,
    pub is_admin: bool,
    pub is_private: bool,
    pub private_user_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SeaOrmStorage {
    /// 写入一条访问记录，返回行 ID
    pub async fn insert_page_view(&self, view: NewPageView) -> Result<i64> {
        let model = page_view::ActiveModel {
            id: NotSet,
            path: Set(view.path),
            referrer_domain: Set(view.referrer_domain),
            utm_source: Set(view.utm_source),
            utm_medium: Set(view.utm_medium),
            utm_campaign: Set(view.utm_campaign),
            utm_term: Set(view.utm_term),
            utm_content: Set(view.utm_content),
            visitor_id: Set(view.visitor_id),
            session_id: Set(view.session_id),
            is_bot: Set(view.is_bot),
            country: Set(view.country),
            region: Set(view.region),
            city: Set(view.city),
            latitude: Set(view.latitude),
            longitude: Set(view.longitude),
            is_admin: Set(view.is_admin),
            is_private: Set(view.is_private),
            private_user_id: Set(view.private_user_id),
            created_at: Set(view.created_at.unwrap_or_else(Utc::now)),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            error!("写入访问记录失败: {}", e);
            e
        })?;
        debug!("Page view recorded: id={} path={}", inserted.id, inserted.path);
        Ok(inserted.id)
    }

    /// 读取窗口内可统计的访问记录（排除 bot / admin / private），按时间升序
    pub async fn fetch_views(&self, window: &Window) -> Result<Vec<ViewRecord>> {
        let models = page_view::Entity::find()
            .filter(page_view::Column::CreatedAt.gte(window.start))
            .filter(page_view::Column::CreatedAt.lt(window.end))
            .filter(page_view::Column::IsBot.eq(false))
            .filter(page_view::Column::IsAdmin.eq(false))
            .filter(page_view::Column::IsPrivate.eq(false))
            .order_by_asc(page_view::Column::CreatedAt)
            .order_by_asc(page_view::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("查询访问记录失败: {}", e);
                e
            })?;

        Ok(models.into_iter().map(ViewRecord::from).collect())
    }

    /// 最早一条可统计记录的时间（`all` 范围的起点）
    pub async fn earliest_view_at(&self) -> Result<Option<DateTime<Utc>>> {
        let earliest = page_view::Entity::find()
            .select_only()
            .column(page_view::Column::CreatedAt)
            .filter(page_view::Column::IsBot.eq(false))
            .filter(page_view::Column::IsAdmin.eq(false))
            .filter(page_view::Column::IsPrivate.eq(false))
            .order_by_asc(page_view::Column::CreatedAt)
            .into_tuple::<DateTime<Utc>>()
            .one(&self.db)
            .await?;
        Ok(earliest)
    }

    /// 按访客查询（测试与排查用）
    pub async fn views_for_visitor(&self, visitor_id: &str) -> Result<Vec<page_view::Model>> {
        Ok(page_view::Entity::find()
            .filter(page_view::Column::VisitorId.eq(visitor_id))
            .order_by_asc(page_view::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn count_page_views(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;
        Ok(page_view::Entity::find().count(&self.db).await?)
    }
}
