//! 内容表迁移
//!
//! field_notes / selected_works / guestbook_entries /
//! work_companies / work_positions / howdy_content

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 所有内容表共用的列：自增主键
fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn flag_col<T: IntoIden>(col: T, default: bool) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(default)
        .to_owned()
}

fn order_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(0).to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FieldNotes::Table)
                    .if_not_exists()
                    .col(id_col(FieldNotes::Id))
                    .col(
                        ColumnDef::new(FieldNotes::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FieldNotes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(FieldNotes::Summary).text().null())
                    .col(ColumnDef::new(FieldNotes::Body).text().not_null())
                    .col(flag_col(FieldNotes::Published, false))
                    .col(flag_col(FieldNotes::IsPrivate, false))
                    .col(order_col(FieldNotes::DisplayOrder))
                    .col(timestamp_col(FieldNotes::CreatedAt))
                    .col(timestamp_col(FieldNotes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SelectedWorks::Table)
                    .if_not_exists()
                    .col(id_col(SelectedWorks::Id))
                    .col(
                        ColumnDef::new(SelectedWorks::Slug)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SelectedWorks::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SelectedWorks::Summary).text().null())
                    .col(ColumnDef::new(SelectedWorks::Body).text().not_null())
                    .col(ColumnDef::new(SelectedWorks::CoverUrl).string_len(2048).null())
                    .col(ColumnDef::new(SelectedWorks::LinkUrl).string_len(2048).null())
                    .col(flag_col(SelectedWorks::Published, false))
                    .col(flag_col(SelectedWorks::IsPrivate, false))
                    .col(order_col(SelectedWorks::DisplayOrder))
                    .col(timestamp_col(SelectedWorks::CreatedAt))
                    .col(timestamp_col(SelectedWorks::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GuestbookEntries::Table)
                    .if_not_exists()
                    .col(id_col(GuestbookEntries::Id))
                    .col(
                        ColumnDef::new(GuestbookEntries::Name)
                            .string_len(80)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GuestbookEntries::Message).text().not_null())
                    .col(
                        ColumnDef::new(GuestbookEntries::Website)
                            .string_len(2048)
                            .null(),
                    )
                    .col(flag_col(GuestbookEntries::Published, false))
                    .col(order_col(GuestbookEntries::DisplayOrder))
                    .col(timestamp_col(GuestbookEntries::CreatedAt))
                    .col(timestamp_col(GuestbookEntries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkCompanies::Table)
                    .if_not_exists()
                    .col(id_col(WorkCompanies::Id))
                    .col(
                        ColumnDef::new(WorkCompanies::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkCompanies::Url).string_len(2048).null())
                    .col(ColumnDef::new(WorkCompanies::LogoUrl).string_len(2048).null())
                    .col(order_col(WorkCompanies::DisplayOrder))
                    .col(timestamp_col(WorkCompanies::CreatedAt))
                    .col(timestamp_col(WorkCompanies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkPositions::Table)
                    .if_not_exists()
                    .col(id_col(WorkPositions::Id))
                    .col(
                        ColumnDef::new(WorkPositions::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkPositions::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkPositions::StartDate)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkPositions::EndDate).string_len(10).null())
                    .col(ColumnDef::new(WorkPositions::Description).text().null())
                    .col(order_col(WorkPositions::DisplayOrder))
                    .col(timestamp_col(WorkPositions::CreatedAt))
                    .col(timestamp_col(WorkPositions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_positions_company")
                            .from(WorkPositions::Table, WorkPositions::CompanyId)
                            .to(WorkCompanies::Table, WorkCompanies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_work_positions_company")
                    .table(WorkPositions::Table)
                    .col(WorkPositions::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HowdyContent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HowdyContent::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HowdyContent::Headline)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HowdyContent::Body).text().not_null())
                    .col(timestamp_col(HowdyContent::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HowdyContent::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_work_positions_company").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkPositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkCompanies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GuestbookEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SelectedWorks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FieldNotes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FieldNotes {
    #[sea_orm(iden = "field_notes")]
    Table,
    Id,
    Slug,
    Title,
    Summary,
    Body,
    Published,
    IsPrivate,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SelectedWorks {
    #[sea_orm(iden = "selected_works")]
    Table,
    Id,
    Slug,
    Title,
    Summary,
    Body,
    CoverUrl,
    LinkUrl,
    Published,
    IsPrivate,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GuestbookEntries {
    #[sea_orm(iden = "guestbook_entries")]
    Table,
    Id,
    Name,
    Message,
    Website,
    Published,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkCompanies {
    #[sea_orm(iden = "work_companies")]
    Table,
    Id,
    Name,
    Url,
    LogoUrl,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkPositions {
    #[sea_orm(iden = "work_positions")]
    Table,
    Id,
    CompanyId,
    Title,
    StartDate,
    EndDate,
    Description,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum HowdyContent {
    #[sea_orm(iden = "howdy_content")]
    Table,
    Id,
    Headline,
    Body,
    UpdatedAt,
}
