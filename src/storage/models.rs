use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 匿名批量导入使用的 owner
pub const ANONYMOUS_OWNER: u32 = 0;

/// 一条短链记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub initial_link: String,
    pub short_link: String,
    /// 0 表示无 owner
    pub owner_id: u32,
    /// 软删除标记，记录保留不清除
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl LinkRecord {
    pub fn new(
        initial_link: impl Into<String>,
        short_link: impl Into<String>,
        owner_id: u32,
    ) -> Self {
        Self {
            initial_link: initial_link.into(),
            short_link: short_link.into(),
            owner_id,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// 同一 owner 的同一长链接视为重复，已删除的记录同样占位
    pub fn duplicates(&self, other: &LinkRecord) -> bool {
        self.initial_link == other.initial_link && self.owner_id == other.owner_id
    }
}

/// 批量创建的输入项，correlation_id 原样透传
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub correlation_id: String,
    pub initial_link: String,
}

/// 批量创建的结果项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub correlation_id: String,
    pub short_link: String,
}

/// 按 owner 列出的链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedLink {
    pub short_link: String,
    pub initial_link: String,
}

impl From<LinkRecord> for OwnedLink {
    fn from(record: LinkRecord) -> Self {
        Self {
            short_link: record.short_link,
            initial_link: record.initial_link,
        }
    }
}
