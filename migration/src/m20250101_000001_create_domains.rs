// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

/// 创建 domains 表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col({
                        // SQLite only auto-increments INTEGER PRIMARY KEY
                        let mut col = ColumnDef::new(Domains::Id);
                        if backend == DbBackend::Sqlite {
                            col.integer();
                        } else {
                            col.big_integer();
                        }
                        col.not_null().auto_increment().primary_key();
                        col
                    })
                    .col(ColumnDef::new(Domains::Url).string_len(2048).not_null())
                    .col(ColumnDef::new(Domains::Status).string_len(32).null())
                    .col(ColumnDef::new(Domains::Matched).boolean().null())
                    .col(ColumnDef::new(Domains::Frameworks).text().null())
                    .col(ColumnDef::new(Domains::Helpdesks).text().null())
                    .col(ColumnDef::new(Domains::Emails).text().null())
                    .col(ColumnDef::new(Domains::ContactPageLinks).text().null())
                    .col(ColumnDef::new(Domains::FaqPageLinks).text().null())
                    .col(ColumnDef::new(Domains::Data).text().null())
                    .col({
                        let mut col = ColumnDef::new(Domains::Html);
                        if backend == DbBackend::MySql {
                            col.custom(Alias::new("LONGTEXT"));
                        } else {
                            col.text();
                        }
                        col.null();
                        col
                    })
                    .col(
                        ColumnDef::new(Domains::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Domains::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_status")
                    .table(Domains::Table)
                    .col(Domains::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Url,
    Status,
    Matched,
    Frameworks,
    Helpdesks,
    Emails,
    ContactPageLinks,
    FaqPageLinks,
    Data,
    Html,
    StartedAt,
    CompletedAt,
}
