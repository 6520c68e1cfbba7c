// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 模型（models）：记录、状态和分类结果
/// - 仓库接口（repositories）：记录的认领与写回抽象
/// - 服务（services）：从页面正文中提取信号
pub mod models;
pub mod repositories;
pub mod services;
