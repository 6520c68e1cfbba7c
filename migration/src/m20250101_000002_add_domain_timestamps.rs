// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 为已有的 domains 表补齐处理时间列
///
/// 既有部署中的表早于本程序创建，`create_table(..).if_not_exists()` 会跳过它，
/// 因此缺失的列在这里逐个补上。
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in [
            ("started_at", Domains::StartedAt),
            ("completed_at", Domains::CompletedAt),
        ] {
            if manager.has_column("domains", name).await? {
                continue;
            }

            // SQLite accepts a single column per ALTER TABLE
            manager
                .alter_table(
                    Table::alter()
                        .table(Domains::Table)
                        .add_column(ColumnDef::new(column).timestamp_with_time_zone().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    // The columns belong to the table created by the previous migration,
    // whose rollback drops them together with the table.
    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Domains {
    Table,
    StartedAt,
    CompletedAt,
}
