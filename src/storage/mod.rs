//! 存储层
//!
//! `LinkBackend` 是三种后端（内存、追加文件、关系型数据库）的共同契约。
//! 后端本身不保证并发安全，写操作取 `&mut self`，由上层 `ShortLinkStore`
//! 的读写锁统一排序。

use async_trait::async_trait;
use tracing::info;

use crate::config::{BackendKind, StaticConfig};
use crate::errors::Result;

pub mod backend;
pub mod file;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use models::{ANONYMOUS_OWNER, BatchItem, BatchResult, LinkRecord, OwnedLink};

#[async_trait]
pub trait LinkBackend: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// 查找长链接；不存在返回 NotFound，已软删除返回 Deleted
    async fn get(&self, short_link: &str) -> Result<String>;

    /// 写入单条记录
    ///
    /// 同一 owner 已有同一长链接的记录时返回 AlreadyExists，已删除的记录
    /// 同样占位且保持不变。关系型后端在 MySQL/PostgreSQL 上 `initial_link`
    /// 最长 512 字符，超长链接返回 DatabaseOperation；内存、文件和 SQLite
    /// 不限长度。
    async fn put(&mut self, record: LinkRecord) -> Result<()>;

    /// 批量写入
    ///
    /// 关系型后端在事务内执行，任一行冲突或失败整体回滚；内存和文件后端
    /// 逐条写入，已存在的行被跳过，不视为错误。
    async fn put_batch(&mut self, records: Vec<LinkRecord>) -> Result<()>;

    /// 列出 owner 的所有存活记录，按创建时间升序
    async fn list_by_owner(&self, owner_id: u32) -> Result<Vec<LinkRecord>>;

    /// 软删除；owner 不匹配或记录不存在时静默忽略
    async fn soft_delete(&mut self, short_link: &str, owner_id: u32) -> Result<()>;

    /// 存活探测；无意义探测的后端返回 Unsupported
    async fn health_check(&self) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    /// 按配置优先级创建后端：关系型 DSN > 文件路径 > 内存
    pub async fn create(config: &StaticConfig) -> Result<Box<dyn LinkBackend>> {
        let kind = config.backend_kind();
        let backend: Box<dyn LinkBackend> = match kind {
            BackendKind::Relational => {
                Box::new(SeaOrmStorage::from_config(&config.storage).await?)
            }
            BackendKind::File => {
                // backend_kind() 已保证路径存在
                let path = config.storage.file_storage_path().unwrap_or_default();
                Box::new(FileStorage::new(path).await?)
            }
            BackendKind::Memory => Box::new(MemoryStorage::new()),
        };

        info!("Using storage backend: {}", backend.backend_name());
        Ok(backend)
    }
}
