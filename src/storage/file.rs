//! 追加写文件后端
//!
//! 每行一个 JSON 对象：`url`、`result`、`user_id`、可选 `deleted`。
//! 历史行永不改写，软删除追加一条 `deleted: true` 的记录；读取时同一
//! `result` 以最后一行为准。已删除的记录继续占位，再次创建返回
//! AlreadyExists 而不追加新行。没有索引，每次查询扫描整个文件。
//! 日志不做压缩，反复删除/重建同一地址会让文件持续增长。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{LinkBackend, LinkRecord};
use crate::errors::{LinkVaultError, Result};

/// 文件中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileLine {
    url: String,
    result: String,
    #[serde(default)]
    user_id: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<&LinkRecord> for FileLine {
    fn from(record: &LinkRecord) -> Self {
        Self {
            url: record.initial_link.clone(),
            result: record.short_link.clone(),
            user_id: record.owner_id,
            deleted: record.deleted,
            created_at: Some(record.created_at),
        }
    }
}

impl From<FileLine> for LinkRecord {
    fn from(line: FileLine) -> Self {
        Self {
            initial_link: line.url,
            short_link: line.result,
            owner_id: line.user_id,
            deleted: line.deleted,
            created_at: line.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// 打开（必要时创建）记录文件
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                LinkVaultError::file_operation(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                LinkVaultError::file_operation(format!(
                    "Failed to open link file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        info!("File storage initialized: {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<LinkRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<FileLine>(line)
                    .map(LinkRecord::from)
                    .map_err(|e| {
                        LinkVaultError::serialization(format!(
                            "{}:{}: {}",
                            self.path.display(),
                            idx + 1,
                            e
                        ))
                    })
            })
            .collect()
    }

    /// 折叠日志：同一 short_link 取最后一行
    async fn snapshot(&self) -> Result<HashMap<String, LinkRecord>> {
        let mut state = HashMap::new();
        for record in self.read_records().await? {
            state.insert(record.short_link.clone(), record);
        }
        Ok(state)
    }

    async fn append(&self, records: &[LinkRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, &FileLine::from(record))?;
            buf.push(b'\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&buf).await?;
        file.flush().await?;
        Ok(())
    }

    fn conflict(existing: &LinkRecord) -> LinkVaultError {
        LinkVaultError::already_exists(
            existing.short_link.clone(),
            format!("link already exists: {}", existing.initial_link),
        )
    }
}

#[async_trait]
impl LinkBackend for FileStorage {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, short_link: &str) -> Result<String> {
        let last = self
            .read_records()
            .await?
            .into_iter()
            .rev()
            .find(|r| r.short_link == short_link);

        match last {
            Some(record) if record.deleted => Err(LinkVaultError::deleted(format!(
                "link has been removed: {}",
                short_link
            ))),
            Some(record) => Ok(record.initial_link),
            None => Err(LinkVaultError::not_found(format!(
                "link does not exist: {}",
                short_link
            ))),
        }
    }

    async fn put(&mut self, record: LinkRecord) -> Result<()> {
        let state = self.snapshot().await?;
        if let Some(existing) = state.values().find(|r| r.duplicates(&record)) {
            return Err(Self::conflict(existing));
        }

        debug!("File storage append: {}", record.short_link);
        self.append(std::slice::from_ref(&record)).await
    }

    async fn put_batch(&mut self, records: Vec<LinkRecord>) -> Result<()> {
        let mut state = self.snapshot().await?;
        let mut accepted = Vec::with_capacity(records.len());

        for record in records {
            // 已导入的行跳过，不重复追加
            if let Some(existing) = state.values().find(|r| r.duplicates(&record)) {
                debug!("Skipping already imported link: {}", existing.short_link);
                continue;
            }
            state.insert(record.short_link.clone(), record.clone());
            accepted.push(record);
        }

        self.append(&accepted).await?;
        info!("File storage appended {} batch records", accepted.len());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: u32) -> Result<Vec<LinkRecord>> {
        let mut owned: Vec<LinkRecord> = self
            .snapshot()
            .await?
            .into_values()
            .filter(|r| r.is_live() && r.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    async fn soft_delete(&mut self, short_link: &str, owner_id: u32) -> Result<()> {
        let state = self.snapshot().await?;
        match state.get(short_link) {
            Some(record) if record.owner_id == owner_id && record.is_live() => {
                let mut tombstone = record.clone();
                tombstone.deleted = true;
                self.append(std::slice::from_ref(&tombstone)).await
            }
            Some(record) if record.owner_id != owner_id => {
                debug!(
                    "Ignoring delete of {} by non-owner {}",
                    short_link, owner_id
                );
                Ok(())
            }
            // 已删除或不存在
            _ => Ok(()),
        }
    }

    async fn health_check(&self) -> Result<()> {
        Err(LinkVaultError::unsupported(
            "file storage does not support the ping operation",
        ))
    }
}
