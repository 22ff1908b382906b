//! Short-link store
//!
//! 所有后端访问的唯一同步点。写操作（create、create_batch、soft_delete）
//! 取写锁，读操作（resolve、list_for_owner）取读锁，后端本身不需要
//! 并发安全。持锁期间的慢后端调用会拖慢其他操作，这是单进程设计可以接受的代价。
//!
//! Store 从不自动重试，重试策略属于调用方。

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::errors::{LinkVaultError, Result};
use crate::storage::{
    ANONYMOUS_OWNER, BatchItem, BatchResult, LinkBackend, LinkRecord, OwnedLink, StorageFactory,
};
use crate::utils::generate_short_link;

/// create 的结果
///
/// `conflict` 为 true 表示同一 owner 已经缩短过这条链接，`short_link`
/// 仍是那条已有记录的地址。调用方据此选择 409 还是 201。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub short_link: String,
    pub conflict: bool,
}

pub struct ShortLinkStore {
    backend: RwLock<Box<dyn LinkBackend>>,
}

impl ShortLinkStore {
    pub fn new(backend: Box<dyn LinkBackend>) -> Self {
        Self {
            backend: RwLock::new(backend),
        }
    }

    /// 按配置选择后端并创建 Store；后端选择只在启动时发生一次
    pub async fn from_config(config: &StaticConfig) -> Result<Self> {
        let backend = StorageFactory::create(config).await?;
        Ok(Self::new(backend))
    }

    pub async fn backend_name(&self) -> &'static str {
        self.backend.read().await.backend_name()
    }

    pub async fn create(&self, initial_link: &str, owner_id: u32) -> Result<CreateOutcome> {
        let mut backend = self.backend.write().await;

        let short_link = generate_short_link(initial_link, owner_id)?;
        let record = LinkRecord::new(initial_link, short_link.clone(), owner_id);

        match backend.put(record).await {
            Ok(()) => {
                debug!("Created short link {} for owner {}", short_link, owner_id);
                Ok(CreateOutcome {
                    short_link,
                    conflict: false,
                })
            }
            Err(LinkVaultError::AlreadyExists { short_link, .. }) => {
                warn!(
                    "Link already shortened by owner {}: {}",
                    owner_id, short_link
                );
                Ok(CreateOutcome {
                    short_link,
                    conflict: true,
                })
            }
            Err(e) => Err(e.with_context(&format!("create({})", initial_link))),
        }
    }

    /// 批量创建，owner 固定为匿名；correlation_id 原样透传
    ///
    /// 关系型后端整批原子写入，任一行已存在时整批回滚并返回 AlreadyExists；
    /// 内存和文件后端逐条写入并跳过已存在的行，重复导入返回相同地址。
    pub async fn create_batch(&self, items: Vec<BatchItem>) -> Result<Vec<BatchResult>> {
        let mut backend = self.backend.write().await;

        let mut records = Vec::with_capacity(items.len());
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let short_link = generate_short_link(&item.initial_link, ANONYMOUS_OWNER)?;
            records.push(LinkRecord::new(
                item.initial_link,
                short_link.clone(),
                ANONYMOUS_OWNER,
            ));
            results.push(BatchResult {
                correlation_id: item.correlation_id,
                short_link,
            });
        }

        let count = records.len();
        backend
            .put_batch(records)
            .await
            .map_err(|e| e.with_context("create_batch"))?;

        info!("Created {} short links in batch", count);
        Ok(results)
    }

    /// 解析短链接；NotFound 与 Deleted 分开返回
    pub async fn resolve(&self, short_link: &str) -> Result<String> {
        let backend = self.backend.read().await;
        backend
            .get(short_link)
            .await
            .map_err(|e| e.with_context(&format!("resolve({})", short_link)))
    }

    pub async fn list_for_owner(&self, owner_id: u32) -> Result<Vec<OwnedLink>> {
        let backend = self.backend.read().await;
        let records = backend
            .list_by_owner(owner_id)
            .await
            .map_err(|e| e.with_context(&format!("list_for_owner({})", owner_id)))?;
        Ok(records.into_iter().map(OwnedLink::from).collect())
    }

    /// 软删除；owner 不匹配时静默忽略，不暴露他人链接是否存在
    pub async fn soft_delete(&self, short_link: &str, owner_id: u32) -> Result<()> {
        let mut backend = self.backend.write().await;
        backend
            .soft_delete(short_link, owner_id)
            .await
            .map_err(|e| e.with_context(&format!("soft_delete({})", short_link)))
    }

    pub async fn health_check(&self) -> Result<()> {
        self.backend.read().await.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn memory_store() -> ShortLinkStore {
        ShortLinkStore::new(Box::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_create_then_conflict() {
        let store = memory_store();

        let first = store.create("https://example.com/a", 42).await.unwrap();
        assert!(!first.conflict);
        assert_eq!(
            first.short_link,
            generate_short_link("https://example.com/a", 42).unwrap()
        );

        let second = store.create("https://example.com/a", 42).await.unwrap();
        assert!(second.conflict);
        assert_eq!(second.short_link, first.short_link);
        assert_eq!(store.list_for_owner(42).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_errors_carry_context() {
        let store = memory_store();
        let err = store.resolve("missing1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.message().contains("resolve(missing1)"));
    }

    #[tokio::test]
    async fn test_create_batch_passes_correlation_ids() {
        let store = memory_store();
        let results = store
            .create_batch(vec![
                BatchItem {
                    correlation_id: "first".to_string(),
                    initial_link: "https://a.example".to_string(),
                },
                BatchItem {
                    correlation_id: "second".to_string(),
                    initial_link: "https://b.example".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].correlation_id, "first");
        assert_eq!(results[1].correlation_id, "second");
        assert_eq!(
            store.resolve(&results[1].short_link).await.unwrap(),
            "https://b.example"
        );
        assert_eq!(store.list_for_owner(ANONYMOUS_OWNER).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_batch_reimport_returns_same_addresses() {
        let store = memory_store();
        let items = vec![BatchItem {
            correlation_id: "c1".to_string(),
            initial_link: "https://x.example".to_string(),
        }];

        let first = store.create_batch(items.clone()).await.unwrap();
        let second = store.create_batch(items).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list_for_owner(ANONYMOUS_OWNER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health_check_passes_through() {
        let store = memory_store();
        assert!(matches!(
            store.health_check().await,
            Err(LinkVaultError::Unsupported(_))
        ));
        assert_eq!(store.backend_name().await, "memory");
    }
}
