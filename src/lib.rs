// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 分层加载默认值、配置文件和环境变量
pub mod config;

/// 领域模块
///
/// 包含记录状态机、分类结果和信号提取
pub mod domain;

/// 抓取引擎模块
pub mod engines;

/// 基础设施模块
///
/// 数据库访问和指标导出
pub mod infrastructure;

/// 工具模块
pub mod utils;

/// 工作器模块
///
/// 批量调度和单条记录处理
pub mod workers;
