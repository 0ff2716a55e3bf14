pub mod admin_user;
pub mod field_note;
pub mod guestbook_entry;
pub mod howdy_content;
pub mod page_view;
pub mod selected_work;
pub mod site_theme;
pub mod work_company;
pub mod work_position;

pub use admin_user::Entity as AdminUserEntity;
pub use field_note::Entity as FieldNoteEntity;
pub use guestbook_entry::Entity as GuestbookEntryEntity;
pub use howdy_content::Entity as HowdyContentEntity;
pub use page_view::Entity as PageViewEntity;
pub use selected_work::Entity as SelectedWorkEntity;
pub use site_theme::Entity as SiteThemeEntity;
pub use work_company::Entity as WorkCompanyEntity;
pub use work_position::Entity as WorkPositionEntity;
