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

use crate::domain::repositories::domain_repository::DomainRepository;
use crate::engines::traits::Fetcher;
use crate::infrastructure::metrics;
use crate::utils::errors::WorkerError;
use crate::workers::item_processor::{ItemOutcome, ItemProcessor};
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// 一轮调度的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 没有认领到任何记录
    Idle,
    /// 处理了一个批次
    Processed(BatchSummary),
}

/// 批次统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 写回存储失败或任务崩溃的记录数
    pub errored: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped + self.errored
    }

    /// 没有任何记录被推进，通常意味着存储不可写
    pub fn made_no_progress(&self) -> bool {
        self.succeeded + self.failed + self.skipped == 0
    }
}

/// 批量调度器
///
/// 反复认领一批 Pending 记录并并发处理，并发数不超过批大小。
/// 一个批次全部结束后才会认领下一批；没有记录或整批都没有推进时等待空闲间隔。
pub struct BatchScheduler<R, F>
where
    R: DomainRepository + 'static,
    F: Fetcher + 'static,
{
    repository: Arc<R>,
    processor: ItemProcessor<R, F>,
    batch_size: usize,
    idle_interval: Duration,
}

impl<R, F> BatchScheduler<R, F>
where
    R: DomainRepository + 'static,
    F: Fetcher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        processor: ItemProcessor<R, F>,
        batch_size: usize,
        idle_interval: Duration,
    ) -> Self {
        Self {
            repository,
            processor,
            batch_size: batch_size.max(1),
            idle_interval,
        }
    }

    /// 执行一轮：认领并处理一个批次
    ///
    /// 认领失败按空轮处理，由调用方决定是否等待。
    pub async fn run_once(&self) -> BatchOutcome {
        let records = match self.repository.claim_pending(self.batch_size as u64).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to claim pending records: {}", e);
                metrics::record_idle_round();
                return BatchOutcome::Idle;
            }
        };

        if records.is_empty() {
            debug!("No pending records, idling");
            metrics::record_idle_round();
            return BatchOutcome::Idle;
        }

        info!("Claimed batch of {} records", records.len());
        metrics::record_batch(records.len());

        let semaphore = Arc::new(Semaphore::new(self.batch_size));
        let mut handles = Vec::with_capacity(records.len());

        for record in records {
            let processor = self.processor.clone();
            let semaphore = semaphore.clone();
            let id = record.id;

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| WorkerError::InternalError(e.to_string()))?;
                processor
                    .process(record)
                    .await
                    .map_err(|e| WorkerError::RepositoryError(e.to_string()))
            });
            handles.push((id, handle));
        }

        let mut summary = BatchSummary::default();
        for (id, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => {
                    metrics::record_outcome(outcome.label());
                    match outcome {
                        ItemOutcome::Done { .. } => summary.succeeded += 1,
                        ItemOutcome::Failed(_) => summary.failed += 1,
                        ItemOutcome::Skipped => summary.skipped += 1,
                    }
                }
                Ok(Err(e)) => {
                    error!(record_id = id, "Record processing error: {}", e);
                    metrics::record_outcome("error");
                    summary.errored += 1;
                }
                Err(e) => {
                    error!(record_id = id, "Record task panicked: {}", e);
                    metrics::record_outcome("error");
                    summary.errored += 1;
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            errored = summary.errored,
            "Batch finished"
        );

        BatchOutcome::Processed(summary)
    }
}

#[async_trait]
impl<R, F> Worker for BatchScheduler<R, F>
where
    R: DomainRepository + 'static,
    F: Fetcher + 'static,
{
    /// 持续调度，直到任务被取消
    async fn run(&self) -> Result<(), WorkerError> {
        info!(
            batch_size = self.batch_size,
            idle_interval_secs = self.idle_interval.as_secs(),
            "Batch scheduler started"
        );

        loop {
            match self.run_once().await {
                BatchOutcome::Idle => sleep(self.idle_interval).await,
                BatchOutcome::Processed(summary) if summary.made_no_progress() => {
                    warn!(
                        errored = summary.errored,
                        "No record in the batch could be advanced, backing off"
                    );
                    metrics::record_idle_round();
                    sleep(self.idle_interval).await;
                }
                BatchOutcome::Processed(_) => {}
            }
        }
    }

    fn name(&self) -> &str {
        "batch_scheduler"
    }
}
