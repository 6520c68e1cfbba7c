// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::classification::SignalConfig;
use crate::domain::models::domain_record::DomainRecord;
use crate::domain::repositories::domain_repository::{DomainRepository, RepositoryError};
use crate::domain::services::signal_extractor::SignalExtractor;
use crate::engines::traits::{FetchErrorKind, Fetcher};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// 单条记录的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 已写入 Done
    Done {
        /// 是否命中任何信号
        matched: bool,
    },
    /// 抓取失败，已写入 Failed
    Failed(FetchErrorKind),
    /// 记录已被其他处理者推进，未做任何处理
    Skipped,
}

impl ItemOutcome {
    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Done { .. } => "done",
            ItemOutcome::Failed(_) => "failed",
            ItemOutcome::Skipped => "skipped",
        }
    }
}

/// 无法写回存储的处理错误
///
/// 发生这些错误时记录的状态无法被正确推进，只能记录日志交由外部修复。
#[derive(Error, Debug)]
pub enum ProcessError {
    /// 认领失败，记录仍为 Pending
    #[error("Failed to claim record {id}: {source}")]
    Claim {
        id: i64,
        #[source]
        source: RepositoryError,
    },
    /// 写入终态失败，记录停留在 InProgress
    #[error("Failed to commit record {id}: {source}")]
    Commit {
        id: i64,
        #[source]
        source: RepositoryError,
    },
}

/// 单条记录处理器
///
/// 负责一条记录的完整生命周期：认领 → 抓取 → 分类 → 写回终态。
/// 失败只影响当前记录，不会重试。
pub struct ItemProcessor<R, F>
where
    R: DomainRepository,
    F: Fetcher,
{
    repository: Arc<R>,
    fetcher: Arc<F>,
    config: Arc<SignalConfig>,
    fetch_timeout: Duration,
}

impl<R, F> Clone for ItemProcessor<R, F>
where
    R: DomainRepository,
    F: Fetcher,
{
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            fetcher: self.fetcher.clone(),
            config: self.config.clone(),
            fetch_timeout: self.fetch_timeout,
        }
    }
}

impl<R, F> ItemProcessor<R, F>
where
    R: DomainRepository,
    F: Fetcher,
{
    /// 创建记录处理器
    ///
    /// # 参数
    ///
    /// * `repository` - 记录仓库
    /// * `fetcher` - 页面抓取器
    /// * `config` - 信号配置
    /// * `fetch_timeout` - 单次抓取超时时间
    pub fn new(
        repository: Arc<R>,
        fetcher: Arc<F>,
        config: Arc<SignalConfig>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            fetcher,
            config,
            fetch_timeout,
        }
    }

    /// 处理一条记录
    ///
    /// # 返回值
    ///
    /// * `Ok(ItemOutcome)` - 记录已进入终态，或已被其他处理者推进
    /// * `Err(ProcessError)` - 存储写入失败，需要外部介入
    #[instrument(skip(self, record), fields(record_id = record.id, url = %record.url))]
    pub async fn process(&self, record: DomainRecord) -> Result<ItemOutcome, ProcessError> {
        let id = record.id;

        match self.repository.mark_in_progress(id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Record already claimed elsewhere, skipping");
                return Ok(ItemOutcome::Skipped);
            }
            Err(RepositoryError::NotFound) => {
                debug!("Record no longer exists, skipping");
                return Ok(ItemOutcome::Skipped);
            }
            Err(source) => return Err(ProcessError::Claim { id, source }),
        }

        info!(fetcher = self.fetcher.name(), "Processing record");

        let body = match self.fetcher.fetch(&record.url, self.fetch_timeout).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    fetcher = self.fetcher.name(),
                    kind = %e.kind,
                    "Fetch failed: {}",
                    e
                );
                self.repository
                    .commit_failed(id, &e.to_string())
                    .await
                    .map_err(|source| {
                        error!("Failed to record fetch failure: {}", source);
                        ProcessError::Commit { id, source }
                    })?;
                return Ok(ItemOutcome::Failed(e.kind));
            }
        };

        let result = SignalExtractor::classify(&body, &self.config);

        self.repository
            .commit_done(id, &result, &body)
            .await
            .map_err(|source| {
                error!(
                    "Failed to commit result, record left in progress: {}",
                    source
                );
                ProcessError::Commit { id, source }
            })?;

        info!(matched = result.matched, "Processed record successfully");
        Ok(ItemOutcome::Done {
            matched: result.matched,
        })
    }
}
