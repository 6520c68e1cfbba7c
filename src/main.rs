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

use anyhow::Context;
use signalscan::config::settings::Settings;
use signalscan::domain::models::domain_record::RecordStatus;
use signalscan::domain::repositories::domain_repository::DomainRepository;
use signalscan::engines::reqwest_engine::ReqwestFetcher;
use signalscan::infrastructure::database::connection;
use signalscan::infrastructure::metrics;
use signalscan::infrastructure::repositories::domain_repo_impl::DomainRepositoryImpl;
use signalscan::workers::batch_scheduler::BatchScheduler;
use signalscan::workers::item_processor::ItemProcessor;
use signalscan::workers::Worker;
use std::sync::Arc;
use tracing::{error, info, warn};

use migration::{Migrator, MigratorTrait};
use signalscan::utils::telemetry;

/// 主函数
///
/// 加载配置、连接数据库，然后持续调度扫描直到收到中断信号
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load .env and initialize logging
    dotenvy::dotenv().ok();
    telemetry::init_telemetry();
    info!("Starting signalscan...");

    // 2. Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database)
        .await
        .context("Failed to connect to database")?;
    let db = Arc::new(db);
    info!("Database connection established");

    if settings.database.run_migrations {
        info!("Running database migrations...");
        Migrator::up(db.as_ref(), None).await?;
        info!("Database migrations applied");
    }

    let repository = Arc::new(DomainRepositoryImpl::new(db.clone()));

    // 4. Recover records left in progress by an earlier run
    if let Some(secs) = settings.scanner.reset_stale_after_secs {
        let older_than = chrono::Duration::seconds(secs as i64);
        match repository.reset_stale(older_than).await {
            Ok(0) => {}
            Ok(count) => info!("Reset {} stale in-progress records to pending", count),
            Err(e) => warn!("Failed to reset stale records: {}", e),
        }
    }

    match repository.count_by_status().await {
        Ok(counts) => {
            let count = |status: RecordStatus| counts.get(&status).copied().unwrap_or(0);
            info!(
                pending = count(RecordStatus::Pending),
                in_progress = count(RecordStatus::InProgress),
                done = count(RecordStatus::Done),
                failed = count(RecordStatus::Failed),
                "Record status snapshot"
            );
        }
        Err(e) => warn!("Failed to count records by status: {}", e),
    }

    // 5. Build scheduler
    let fetcher = Arc::new(
        ReqwestFetcher::new(&settings.scanner.user_agent)
            .context("Failed to build HTTP client")?,
    );
    let signal_config = Arc::new(settings.signal_config());
    info!(
        frameworks = signal_config.frameworks.len(),
        help_desks = signal_config.help_desks.len(),
        "Signal lists loaded"
    );

    let processor = ItemProcessor::new(
        repository.clone(),
        fetcher,
        signal_config.clone(),
        settings.scanner.fetch_timeout(),
    );
    let scheduler = BatchScheduler::new(
        repository,
        processor,
        signal_config.batch_size,
        settings.scanner.idle_interval(),
    );

    // 6. Run until interrupted
    info!("Starting {}", scheduler.name());
    tokio::select! {
        result = scheduler.run() => result?,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        },
    }

    info!("signalscan stopped");
    Ok(())
}
