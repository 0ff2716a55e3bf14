//! Authentication service
//!
//! 登录校验、首次初始化管理员、私密访客账号管理

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::signed_cookie::{AccessRole, AuthClaims};
use crate::errors::{Result, SiteError};
use crate::storage::models::{PrivateUserInput, UserSummary, blank_to_none, validate_email};
use crate::storage::{NewUser, SeaOrmStorage};
use crate::utils::password::{PasswordError, hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// 对新密码做哈希，长度不足属于用户输入错误
pub fn hash_new_password(password: &str) -> Result<String> {
    hash_password(password).map_err(|e| match e {
        PasswordError::TooShort => SiteError::validation(e.to_string()),
        other => other.into(),
    })
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 校验邮箱和密码，成功返回待签名的 claims
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthClaims> {
        let Some(user) = self.storage.find_user_by_email(email).await? else {
            info!("Login failed: unknown account");
            return Err(SiteError::unauthorized(INVALID_CREDENTIALS));
        };

        let role = AccessRole::from_str(&user.role).map_err(|_| {
            warn!("User {} has unknown role '{}'", user.id, user.role);
            SiteError::unauthorized(INVALID_CREDENTIALS)
        })?;

        if !verify_password(password, &user.password_hash)? {
            info!("Login failed: wrong password for user {}", user.id);
            return Err(SiteError::unauthorized(INVALID_CREDENTIALS));
        }

        info!("User {} signed in as {}", user.id, role.as_ref());
        Ok(AuthClaims::new(user.id, &user.email, role))
    }

    pub async fn has_admin(&self) -> Result<bool> {
        Ok(self
            .storage
            .count_users_with_role(AccessRole::Admin.as_ref())
            .await?
            > 0)
    }

    /// 首次初始化：不存在管理员时用配置中的默认账号创建
    pub async fn setup(&self, email: &str, password: &str) -> Result<UserSummary> {
        if self.has_admin().await? {
            return Err(SiteError::validation("Setup has already been completed"));
        }
        if password.is_empty() {
            return Err(SiteError::validation(
                "Default admin password is not configured (LM__AUTH__DEFAULT_ADMIN_PASSWORD)",
            ));
        }
        let user = self.create_user(email, password, AccessRole::Admin, None).await?;
        info!("Initial admin account created: {}", user.email);
        Ok(user)
    }

    /// 创建账号（CLI 与管理端共用）
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: AccessRole,
        display_name: Option<String>,
    ) -> Result<UserSummary> {
        validate_email(email)?;
        let password_hash = hash_new_password(password)?;
        let user = self
            .storage
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                role: role.as_ref().to_string(),
                display_name: blank_to_none(display_name),
            })
            .await?;
        Ok(user.into())
    }

    pub async fn list_users(&self, role: Option<AccessRole>) -> Result<Vec<UserSummary>> {
        let rows = self
            .storage
            .list_users(role.as_ref().map(|r| r.as_ref()))
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // ---------------------------------------------------------------
    // Private viewers
    // ---------------------------------------------------------------

    pub async fn list_private_users(&self) -> Result<Vec<UserSummary>> {
        self.list_users(Some(AccessRole::Private)).await
    }

    pub async fn get_private_user(&self, id: i64) -> Result<UserSummary> {
        Ok(self
            .storage
            .get_user(id, Some(AccessRole::Private.as_ref()))
            .await?
            .into())
    }

    pub async fn create_private_user(&self, input: PrivateUserInput) -> Result<UserSummary> {
        input.validate()?;
        let password = input
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SiteError::validation("password is required"))?;
        self.create_user(&input.email, password, AccessRole::Private, input.display_name)
            .await
    }

    pub async fn update_private_user(&self, id: i64, input: PrivateUserInput) -> Result<UserSummary> {
        input.validate()?;
        let password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => Some(hash_new_password(p)?),
            None => None,
        };
        let user = self
            .storage
            .update_user(
                id,
                AccessRole::Private.as_ref(),
                &input.email,
                blank_to_none(input.display_name),
                password_hash,
            )
            .await?;
        Ok(user.into())
    }

    pub async fn delete_private_user(&self, id: i64) -> Result<()> {
        self.storage
            .delete_user(id, AccessRole::Private.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_is_validation_error() {
        let err = hash_new_password("short").unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn test_hash_new_password() {
        let hash = hash_new_password("long enough password").unwrap();
        assert!(hash.starts_with("$argon2"));
    }
}
