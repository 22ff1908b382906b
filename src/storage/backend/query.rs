//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::model_to_record;
use super::deadline::with_deadline;
use crate::errors::{LinkVaultError, Result};
use crate::storage::{ANONYMOUS_OWNER, LinkRecord};

use migration::entities::shortened_link;

/// owner 过滤条件；匿名 owner 同时匹配 NULL（旧批量导入写入的行）
pub(super) fn owner_condition(owner_id: u32) -> Condition {
    let condition = Condition::any().add(shortened_link::Column::UserId.eq(i64::from(owner_id)));
    if owner_id == ANONYMOUS_OWNER {
        condition.add(shortened_link::Column::UserId.is_null())
    } else {
        condition
    }
}

/// 存活行：deleted 为 NULL 或 false
pub(super) fn live_condition() -> Condition {
    Condition::any()
        .add(shortened_link::Column::Deleted.is_null())
        .add(shortened_link::Column::Deleted.eq(false))
}

/// 按 (initial_link, owner) 查找已有行，包括已软删除的
pub(super) async fn find_existing<C: ConnectionTrait>(
    conn: &C,
    initial_link: &str,
    owner_id: u32,
) -> std::result::Result<Option<shortened_link::Model>, sea_orm::DbErr> {
    shortened_link::Entity::find()
        .filter(shortened_link::Column::InitialLink.eq(initial_link))
        .filter(owner_condition(owner_id))
        .order_by_asc(shortened_link::Column::Id)
        .one(conn)
        .await
}

impl SeaOrmStorage {
    pub async fn find_initial_link(&self, short_link: &str) -> Result<String> {
        let rows = with_deadline(
            &format!("get({})", short_link),
            self.point_timeout,
            shortened_link::Entity::find()
                .filter(shortened_link::Column::ShortLink.eq(short_link))
                .order_by_asc(shortened_link::Column::Id)
                .all(&self.db),
        )
        .await?;

        let mut tombstoned = false;
        for model in rows {
            if model.deleted.unwrap_or(false) {
                tombstoned = true;
            } else {
                return Ok(model.initial_link);
            }
        }

        if tombstoned {
            Err(LinkVaultError::deleted(format!(
                "link has been removed: {}",
                short_link
            )))
        } else {
            Err(LinkVaultError::not_found(format!(
                "link does not exist: {}",
                short_link
            )))
        }
    }

    pub async fn owned_records(&self, owner_id: u32) -> Result<Vec<LinkRecord>> {
        let models = with_deadline(
            &format!("list_by_owner({})", owner_id),
            self.batch_timeout,
            shortened_link::Entity::find()
                .filter(owner_condition(owner_id))
                .filter(live_condition())
                .order_by_asc(shortened_link::Column::DateOfCreate)
                .order_by_asc(shortened_link::Column::Id)
                .all(&self.db),
        )
        .await?;

        debug!("Loaded {} links for owner {}", models.len(), owner_id);
        Ok(models.into_iter().map(model_to_record).collect())
    }

    /// 轻量存活探测
    pub async fn ping(&self) -> Result<()> {
        with_deadline(
            "ping",
            self.point_timeout,
            shortened_link::Entity::find()
                .select_only()
                .column(shortened_link::Column::Id)
                .limit(1)
                .into_tuple::<i64>()
                .one(&self.db),
        )
        .await?;
        Ok(())
    }
}
