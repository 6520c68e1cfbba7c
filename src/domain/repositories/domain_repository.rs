// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::classification::ClassificationResult;
use crate::domain::models::domain_record::{DomainError, DomainRecord, RecordStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到，或不处于要求的状态
    #[error("Record not found")]
    NotFound,
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 存储中的数据无法映射为领域对象
    #[error("Invalid stored data: {0}")]
    Domain(#[from] DomainError),
}

/// 域名记录仓库特质
///
/// 所有操作都以单条记录为粒度保证原子性。
/// 同一条记录的并发写入由存储层串行化，调用方无需加锁。
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// 选取至多 `limit` 条 Pending 记录
    ///
    /// 按 id 升序返回，只包含 id 和 url，不修改记录。
    async fn claim_pending(&self, limit: u64) -> Result<Vec<DomainRecord>, RepositoryError>;

    /// 将记录从 Pending 原子地转换为 InProgress
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 认领成功
    /// * `Ok(false)` - 记录已不再处于 Pending（被其他处理者推进）
    /// * `Err(RepositoryError::NotFound)` - 记录不存在
    async fn mark_in_progress(&self, id: i64) -> Result<bool, RepositoryError>;

    /// 将记录从 InProgress 转换为 Done，并保存结果和原始页面
    async fn commit_done(
        &self,
        id: i64,
        result: &ClassificationResult,
        body: &str,
    ) -> Result<(), RepositoryError>;

    /// 将记录从 InProgress 转换为 Failed，并保存错误信息
    async fn commit_failed(&self, id: i64, message: &str) -> Result<(), RepositoryError>;

    /// 根据ID查找记录
    async fn find_by_id(&self, id: i64) -> Result<Option<DomainRecord>, RepositoryError>;

    /// 重置处理时间超过阈值的 InProgress 记录为 Pending
    async fn reset_stale(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError>;

    /// 各状态的记录数量
    async fn count_by_status(&self) -> Result<HashMap<RecordStatus, u64>, RepositoryError>;
}

#[async_trait]
impl<T: DomainRepository + ?Sized> DomainRepository for Arc<T> {
    async fn claim_pending(&self, limit: u64) -> Result<Vec<DomainRecord>, RepositoryError> {
        (**self).claim_pending(limit).await
    }

    async fn mark_in_progress(&self, id: i64) -> Result<bool, RepositoryError> {
        (**self).mark_in_progress(id).await
    }

    async fn commit_done(
        &self,
        id: i64,
        result: &ClassificationResult,
        body: &str,
    ) -> Result<(), RepositoryError> {
        (**self).commit_done(id, result, body).await
    }

    async fn commit_failed(&self, id: i64, message: &str) -> Result<(), RepositoryError> {
        (**self).commit_failed(id, message).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DomainRecord>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn reset_stale(&self, older_than: chrono::Duration) -> Result<u64, RepositoryError> {
        (**self).reset_stale(older_than).await
    }

    async fn count_by_status(&self) -> Result<HashMap<RecordStatus, u64>, RepositoryError> {
        (**self).count_by_status().await
    }
}
