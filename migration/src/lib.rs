pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_page_views;
mod m20260301_000002_content_tables;
mod m20260301_000003_admin_users;
mod m20260302_000001_site_theme;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_page_views::Migration),
            Box::new(m20260301_000002_content_tables::Migration),
            Box::new(m20260301_000003_admin_users::Migration),
            Box::new(m20260302_000001_site_theme::Migration),
        ]
    }
}
