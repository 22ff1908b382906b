//! SeaORM storage backend
//!
//! 关系型后端，支持 SQLite、MySQL/MariaDB 和 PostgreSQL。
//! 每次数据库调用都带超时，超时返回 Timeout 而不是无限挂起。

mod connection;
mod converters;
mod deadline;
mod mutations;
mod query;

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::{LinkBackend, LinkRecord};
use crate::config::StorageConfig;
use crate::errors::{LinkVaultError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, record_to_active_model};
pub use deadline::with_deadline;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(LinkVaultError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// mariadb:// 交给 MySQL 驱动处理
fn normalize_url(database_url: &str) -> String {
    match database_url.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => database_url.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: &'static str,
    point_timeout: Duration,
    batch_timeout: Duration,
}

impl SeaOrmStorage {
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let database_url = config
            .database_dsn()
            .ok_or_else(|| LinkVaultError::database_config("DATABASE_DSN is not set"))?;
        Self::new(database_url, config).await
    }

    pub async fn new(database_url: &str, config: &StorageConfig) -> Result<Self> {
        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config).await?
        } else {
            connect_generic(&normalize_url(database_url), backend_name, config).await?
        };

        run_migrations(&db).await?;

        warn!("{} storage initialized.", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name,
            point_timeout: config.point_timeout(),
            batch_timeout: config.batch_timeout(),
        })
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn database_kind(&self) -> &'static str {
        self.backend_name
    }
}

#[async_trait]
impl LinkBackend for SeaOrmStorage {
    fn backend_name(&self) -> &'static str {
        "relational"
    }

    async fn get(&self, short_link: &str) -> Result<String> {
        self.find_initial_link(short_link).await
    }

    async fn put(&mut self, record: LinkRecord) -> Result<()> {
        self.insert_record(record).await
    }

    async fn put_batch(&mut self, records: Vec<LinkRecord>) -> Result<()> {
        self.insert_batch(records).await
    }

    async fn list_by_owner(&self, owner_id: u32) -> Result<Vec<LinkRecord>> {
        self.owned_records(owner_id).await
    }

    async fn soft_delete(&mut self, short_link: &str, owner_id: u32) -> Result<()> {
        self.tombstone(short_link, owner_id).await
    }

    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend_from_url("sqlite://links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("links.sqlite").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@localhost/links").unwrap(),
            "postgres"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/links").unwrap(),
            "mysql"
        );
        assert!(matches!(
            infer_backend_from_url("redis://localhost"),
            Err(LinkVaultError::DatabaseConfig(_))
        ));
    }

    #[test]
    fn test_normalize_mariadb_url() {
        assert_eq!(
            normalize_url("mariadb://u:p@localhost/links"),
            "mysql://u:p@localhost/links"
        );
        assert_eq!(normalize_url("postgres://localhost"), "postgres://localhost");
    }
}
