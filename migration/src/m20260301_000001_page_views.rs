//! 访问日志表迁移
//!
//! 创建 page_views 表，每个通过过滤链的页面访问写入一行：
//! - 路径、来源域名、UTM 参数
//! - 访客 / 会话 ID
//! - 地理位置 (country, region, city, latitude, longitude)
//! - admin / private 标记

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PageViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PageViews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PageViews::Path).text().not_null())
                    .col(ColumnDef::new(PageViews::ReferrerDomain).string_len(255).null())
                    .col(ColumnDef::new(PageViews::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(PageViews::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(PageViews::UtmCampaign).string_len(255).null())
                    .col(ColumnDef::new(PageViews::UtmTerm).string_len(255).null())
                    .col(ColumnDef::new(PageViews::UtmContent).string_len(255).null())
                    .col(ColumnDef::new(PageViews::VisitorId).string_len(64).not_null())
                    .col(ColumnDef::new(PageViews::SessionId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(PageViews::IsBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PageViews::Country).string_len(2).null())
                    .col(ColumnDef::new(PageViews::Region).string_len(100).null())
                    .col(ColumnDef::new(PageViews::City).string_len(100).null())
                    .col(ColumnDef::new(PageViews::Latitude).double().null())
                    .col(ColumnDef::new(PageViews::Longitude).double().null())
                    .col(
                        ColumnDef::new(PageViews::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PageViews::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PageViews::PrivateUserId).big_integer().null())
                    .col(
                        ColumnDef::new(PageViews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 时间范围查询（所有聚合都按 created_at 过滤）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_views_created_at")
                    .table(PageViews::Table)
                    .col(PageViews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 热门页面排行
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_views_path_time")
                    .table(PageViews::Table)
                    .col(PageViews::Path)
                    .col(PageViews::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_page_views_visitor")
                    .table(PageViews::Table)
                    .col(PageViews::VisitorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_page_views_visitor").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_page_views_path_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_page_views_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PageViews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PageViews {
    #[sea_orm(iden = "page_views")]
    Table,
    Id,
    Path,
    ReferrerDomain,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmTerm,
    UtmContent,
    VisitorId,
    SessionId,
    IsBot,
    Country,
    Region,
    City,
    Latitude,
    Longitude,
    IsAdmin,
    IsPrivate,
    PrivateUserId,
    CreatedAt,
}
