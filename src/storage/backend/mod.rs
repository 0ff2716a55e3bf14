//! SeaORM storage backend
//!
//! SQLite / MySQL / PostgreSQL, backend inferred from the URL.

mod connection;
mod content;
mod page_views;
mod users;

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::errors::{Result, SiteError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use content::Collection;
pub use page_views::NewPageView;
pub use users::{NewUser, normalize_email};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(SiteError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(SiteError::database_config("database_url 未设置"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config.pool_size, config.timeout).await?
        };

        let storage = SeaOrmStorage { db, backend_name };
        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 健康检查用
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(SiteError::from)
    }

    pub async fn close(&self) {
        if let Err(e) = self.db.clone().close().await {
            warn!("关闭数据库连接失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(
            infer_backend_from_url("sqlite://site.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("data/site.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("postgres://u:p@localhost/site").unwrap(),
            "postgres"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://localhost/site").unwrap(),
            "mysql"
        );
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }
}
