use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "work_positions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub title: String,
    /// `YYYY-MM`
    pub start_date: String,
    /// None = current position
    pub end_date: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub display_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_company::Entity",
        from = "Column::CompanyId",
        to = "super::work_company::Column::Id",
        on_delete = "Cascade"
    )]
    WorkCompany,
}

impl Related<super::work_company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkCompany.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
