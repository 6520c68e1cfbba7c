// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供批量调度和单条记录处理
/// 包括认领、并发控制和结果写回
pub mod batch_scheduler;
pub mod item_processor;
pub mod worker;

pub use worker::Worker;
