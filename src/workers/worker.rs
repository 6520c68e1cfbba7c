// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 长期运行的后台循环
///
/// `main` 通过此trait启动扫描循环并在中断信号到来时丢弃它
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行直到被取消；只有无法继续调度时才返回错误
    async fn run(&self) -> Result<(), WorkerError>;

    /// 日志中使用的名称
    fn name(&self) -> &str;
}
