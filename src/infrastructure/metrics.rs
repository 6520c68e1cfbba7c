// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

pub const RECORDS_TOTAL: &str = "signalscan_records_total";
pub const BATCHES_TOTAL: &str = "signalscan_batches_total";
pub const IDLE_ROUNDS_TOTAL: &str = "signalscan_idle_rounds_total";
pub const BATCH_SIZE: &str = "signalscan_batch_size";

/// 初始化指标系统
///
/// 未启用时不安装导出器，指标宏调用退化为空操作。
/// 监听地址非法或端口被占用只记录告警，不影响扫描。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics listen address {}: {}",
                settings.listen_addr, e
            );
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_counter!(RECORDS_TOTAL, "Records processed, labelled by outcome");
    describe_counter!(BATCHES_TOTAL, "Non-empty batches claimed");
    describe_counter!(IDLE_ROUNDS_TOTAL, "Rounds that found nothing to claim");
    describe_histogram!(BATCH_SIZE, "Number of records per claimed batch");

    info!("Metrics exporter listening on {}", addr);
}

/// 记录一条记录的处理结果
pub fn record_outcome(outcome: &'static str) {
    counter!(RECORDS_TOTAL, "outcome" => outcome).increment(1);
}

/// 记录一次非空批次
pub fn record_batch(size: usize) {
    counter!(BATCHES_TOTAL).increment(1);
    histogram!(BATCH_SIZE).record(size as f64);
}

/// 记录一次空轮询
pub fn record_idle_round() {
    counter!(IDLE_ROUNDS_TOTAL).increment(1);
}
