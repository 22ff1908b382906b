//! shortened_links 表
//!
//! 唯一约束建立在 (initial_link, user_id) 上：同一用户重复提交同一长链接
//! 只会命中已有行，不同用户之间互不影响。initial_link 限长 512，
//! 保证 MySQL 上联合唯一索引不超过 3072 字节。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShortenedLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortenedLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShortenedLinks::InitialLink)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShortenedLinks::ShortLink)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShortenedLinks::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(ShortenedLinks::DateOfCreate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShortenedLinks::Deleted).boolean().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_shortened_links_initial_user")
                    .table(ShortenedLinks::Table)
                    .col(ShortenedLinks::InitialLink)
                    .col(ShortenedLinks::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按短链查找
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shortened_links_short_link")
                    .table(ShortenedLinks::Table)
                    .col(ShortenedLinks::ShortLink)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shortened_links_user_id")
                    .table(ShortenedLinks::Table)
                    .col(ShortenedLinks::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shortened_links_user_id")
                    .table(ShortenedLinks::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_shortened_links_short_link")
                    .table(ShortenedLinks::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_shortened_links_initial_user")
                    .table(ShortenedLinks::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ShortenedLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortenedLinks {
    Table,
    Id,
    InitialLink,
    ShortLink,
    UserId,
    DateOfCreate,
    Deleted,
}
