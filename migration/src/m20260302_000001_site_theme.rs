//! 当前主题指针（单行表，id 固定为 1）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SiteTheme::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SiteTheme::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SiteTheme::ActiveTheme)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SiteTheme::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteTheme::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SiteTheme {
    #[sea_orm(iden = "site_theme")]
    Table,
    Id,
    ActiveTheme,
    UpdatedAt,
}
