use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::{LinkBackend, LinkRecord};
use crate::errors::{LinkVaultError, Result};

/// 内存后端：short_link -> 记录
///
/// 重复检查是线性扫描；写操作已被上层读写锁串行化。
/// 记录写入后只有 deleted 会改变，墓碑不会被覆盖或移除，
/// 对已删除链接的再次创建返回 AlreadyExists。
#[derive(Debug, Default)]
pub struct MemoryStorage {
    links: HashMap<String, LinkRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_duplicate(&self, record: &LinkRecord) -> Option<&LinkRecord> {
        self.links.values().find(|existing| existing.duplicates(record))
    }

    fn insert(&mut self, record: LinkRecord) -> Result<()> {
        if let Some(existing) = self.find_duplicate(&record) {
            return Err(LinkVaultError::already_exists(
                existing.short_link.clone(),
                format!("link already exists: {}", record.initial_link),
            ));
        }

        debug!("Memory storage insert: {}", record.short_link);
        self.links.insert(record.short_link.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl LinkBackend for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, short_link: &str) -> Result<String> {
        match self.links.get(short_link) {
            Some(record) if record.deleted => Err(LinkVaultError::deleted(format!(
                "link has been removed: {}",
                short_link
            ))),
            Some(record) => Ok(record.initial_link.clone()),
            None => Err(LinkVaultError::not_found(format!(
                "link does not exist: {}",
                short_link
            ))),
        }
    }

    async fn put(&mut self, record: LinkRecord) -> Result<()> {
        self.insert(record)
    }

    async fn put_batch(&mut self, records: Vec<LinkRecord>) -> Result<()> {
        for record in records {
            match self.insert(record) {
                Ok(()) => {}
                // 已导入的行保持原样，地址由生成器决定，与已有记录一致
                Err(LinkVaultError::AlreadyExists { short_link, .. }) => {
                    debug!("Skipping already imported link: {}", short_link)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: u32) -> Result<Vec<LinkRecord>> {
        let mut owned: Vec<LinkRecord> = self
            .links
            .values()
            .filter(|r| r.is_live() && r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    async fn soft_delete(&mut self, short_link: &str, owner_id: u32) -> Result<()> {
        match self.links.get_mut(short_link) {
            Some(record) if record.owner_id == owner_id => {
                record.deleted = true;
            }
            Some(_) => debug!(
                "Ignoring delete of {} by non-owner {}",
                short_link, owner_id
            ),
            None => debug!("Ignoring delete of unknown link {}", short_link),
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Err(LinkVaultError::unsupported(
            "memory storage does not support the ping operation",
        ))
    }
}
