// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.


use signalscan::domain::models::classification::SignalConfig;
use signalscan::workers::batch_scheduler::BatchScheduler;
use signalscan::workers::item_processor::ItemProcessor;
use std::sync::Arc;
use std::time::Duration;

pub use mock_repository::InMemoryRepository;
pub use scripted_fetcher::{Scripted, ScriptedFetcher};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const IDLE_INTERVAL: Duration = Duration::from_secs(10);

pub fn signal_config(frameworks: &[&str], help_desks: &[&str], batch_size: usize) -> SignalConfig {
    SignalConfig::new(
        frameworks.iter().map(|s| s.to_string()).collect(),
        help_desks.iter().map(|s| s.to_string()).collect(),
        batch_size,
    )
}

pub fn processor(
    repository: Arc<InMemoryRepository>,
    fetcher: Arc<ScriptedFetcher>,
    config: SignalConfig,
) -> ItemProcessor<InMemoryRepository, ScriptedFetcher> {
    ItemProcessor::new(repository, fetcher, Arc::new(config), FETCH_TIMEOUT)
}

pub fn scheduler(
    repository: Arc<InMemoryRepository>,
    fetcher: Arc<ScriptedFetcher>,
    batch_size: usize,
) -> BatchScheduler<InMemoryRepository, ScriptedFetcher> {
    let config = signal_config(&["react"], &["zendesk"], batch_size);
    let processor = processor(repository.clone(), fetcher, config);
    BatchScheduler::new(repository, processor, batch_size, IDLE_INTERVAL)
}
