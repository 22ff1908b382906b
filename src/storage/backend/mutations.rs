//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.
//! 写入后只有 deleted 会改变：已删除的行继续占据 (initial_link, user_id)，
//! 再次创建返回 AlreadyExists，墓碑和 date_of_create 保持不变。

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::record_to_active_model;
use super::deadline::with_deadline;
use super::query::{find_existing, live_condition, owner_condition};
use crate::errors::{LinkVaultError, Result};
use crate::storage::LinkRecord;

use migration::entities::shortened_link;

fn conflict(short_link: &str, initial_link: &str) -> LinkVaultError {
    LinkVaultError::already_exists(
        short_link.to_string(),
        format!("link already exists: {}", initial_link),
    )
}

/// 唯一索引冲突映射为 AlreadyExists，其余错误照常转换
fn map_insert_error(err: DbErr, record: &LinkRecord) -> LinkVaultError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            conflict(&record.short_link, &record.initial_link)
        }
        _ => err.into(),
    }
}

/// 写入一行：已有行（包括已删除）返回 AlreadyExists，否则插入
async fn write_one<C: ConnectionTrait>(conn: &C, record: &LinkRecord) -> Result<()> {
    match find_existing(conn, &record.initial_link, record.owner_id).await? {
        Some(existing) => {
            if existing.deleted.unwrap_or(false) {
                debug!("Link was removed, keeping tombstone: {}", existing.short_link);
            }
            Err(conflict(&existing.short_link, &existing.initial_link))
        }
        None => {
            shortened_link::Entity::insert(record_to_active_model(record))
                .exec(conn)
                .await
                .map_err(|e| map_insert_error(e, record))?;
            Ok(())
        }
    }
}

impl SeaOrmStorage {
    pub async fn insert_record(&self, record: LinkRecord) -> Result<()> {
        let db = &self.db;
        with_deadline(
            &format!("put({})", record.short_link),
            self.point_timeout,
            async {
                let txn = db.begin().await?;
                write_one(&txn, &record).await?;
                txn.commit().await?;
                Ok::<_, LinkVaultError>(())
            },
        )
        .await?;

        info!("Short link stored: {}", record.short_link);
        Ok(())
    }

    /// 批量写入（使用事务）
    ///
    /// 任一行冲突或失败时整个事务回滚，已写入的行不会残留。
    pub async fn insert_batch(&self, records: Vec<LinkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let db = &self.db;
        let count = records.len();
        with_deadline(
            &format!("put_batch({} records)", count),
            self.batch_timeout,
            async {
                let txn = db.begin().await?;
                for record in &records {
                    // 出错时 txn 被 drop，自动回滚
                    write_one(&txn, record).await?;
                }
                txn.commit().await?;
                Ok::<_, LinkVaultError>(())
            },
        )
        .await?;

        info!("Batch inserted {} links", count);
        Ok(())
    }

    /// 将 owner 的记录标记为已删除；不匹配的行不受影响
    pub async fn tombstone(&self, short_link: &str, owner_id: u32) -> Result<()> {
        let result = with_deadline(
            &format!("soft_delete({})", short_link),
            self.point_timeout,
            shortened_link::Entity::update_many()
                .col_expr(shortened_link::Column::Deleted, Expr::value(true))
                .filter(shortened_link::Column::ShortLink.eq(short_link))
                .filter(owner_condition(owner_id))
                .filter(live_condition())
                .exec(&self.db),
        )
        .await?;

        if result.rows_affected == 0 {
            debug!(
                "Soft delete of {} by owner {} matched no live rows",
                short_link, owner_id
            );
        } else {
            info!("Short link soft-deleted: {}", short_link);
        }
        Ok(())
    }
}
