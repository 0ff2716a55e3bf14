//! admin_users 读写（管理员与私密访客共用一张表）

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::info;

use super::SeaOrmStorage;
use crate::errors::{Result, SiteError};

use migration::entities::admin_user;

/// 新账号
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub display_name: Option<String>,
}

impl SeaOrmStorage {
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<admin_user::Model>> {
        Ok(admin_user::Entity::find()
            .filter(admin_user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    pub async fn get_user(&self, id: i64, role: Option<&str>) -> Result<admin_user::Model> {
        let mut query = admin_user::Entity::find_by_id(id);
        if let Some(role) = role {
            query = query.filter(admin_user::Column::Role.eq(role));
        }
        query
            .one(&self.db)
            .await?
            .ok_or_else(|| SiteError::not_found(format!("user {} not found", id)))
    }

    pub async fn list_users(&self, role: Option<&str>) -> Result<Vec<admin_user::Model>> {
        let mut query = admin_user::Entity::find();
        if let Some(role) = role {
            query = query.filter(admin_user::Column::Role.eq(role));
        }
        Ok(query
            .order_by_asc(admin_user::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn count_users_with_role(&self, role: &str) -> Result<u64> {
        Ok(admin_user::Entity::find()
            .filter(admin_user::Column::Role.eq(role))
            .count(&self.db)
            .await?)
    }

    pub async fn create_user(&self, user: NewUser) -> Result<admin_user::Model> {
        let email = normalize_email(&user.email);
        if self.find_user_by_email(&email).await?.is_some() {
            return Err(SiteError::validation(format!(
                "email '{}' is already registered",
                email
            )));
        }
        let now = Utc::now();
        let model = admin_user::ActiveModel {
            id: NotSet,
            email: Set(email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            display_name: Set(user.display_name),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await?;
        info!("User created: {} ({})", inserted.email, inserted.role);
        Ok(inserted)
    }

    /// 更新账号信息；`password_hash` 为 None 时保留原密码
    pub async fn update_user(
        &self,
        id: i64,
        role: &str,
        email: &str,
        display_name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<admin_user::Model> {
        let existing = self.get_user(id, Some(role)).await?;
        let email = normalize_email(email);
        if email != existing.email && self.find_user_by_email(&email).await?.is_some() {
            return Err(SiteError::validation(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let mut model = existing.into_active_model();
        model.email = Set(email);
        model.display_name = Set(display_name);
        if let Some(hash) = password_hash {
            model.password_hash = Set(hash);
        }
        model.updated_at = Set(Utc::now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_user(&self, id: i64, role: &str) -> Result<()> {
        let result = admin_user::Entity::delete_many()
            .filter(admin_user::Column::Id.eq(id))
            .filter(admin_user::Column::Role.eq(role))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(SiteError::not_found(format!("user {} not found", id)));
        }
        info!("User deleted: {}", id);
        Ok(())
    }
}

/// 邮箱比较不区分大小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
