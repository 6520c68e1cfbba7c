// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::classification::ClassificationResult;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 域名记录实体
///
/// 一个待抓取并分类的工作单元。记录由外部创建，
/// 本系统只负责认领、处理并写回终态，从不删除记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// 存储层分配的唯一标识符
    pub id: i64,
    /// 需要抓取的目标URL
    pub url: String,
    /// 记录状态
    pub status: RecordStatus,
    /// 分类结果，仅在 Done 状态下存在
    pub result: Option<ClassificationResult>,
    /// 错误信息，仅在 Failed 状态下存在
    pub error_message: Option<String>,
    /// 开始处理时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 进入终态的时间
    pub completed_at: Option<DateTime<FixedOffset>>,
}

/// 记录状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → InProgress → Done/Failed
///
/// InProgress 只能由外部修复流程重置回 Pending。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// 等待处理
    #[default]
    Pending,
    /// 已被认领，正在处理
    InProgress,
    /// 处理成功
    Done,
    /// 处理失败
    Failed,
}

impl RecordStatus {
    /// 数据库 `status` 列中的取值
    ///
    /// Pending 对应 NULL，其余沿用既有表中的字面值。
    pub fn as_column_value(&self) -> Option<&'static str> {
        match self {
            RecordStatus::Pending => None,
            RecordStatus::InProgress => Some("inProgress"),
            RecordStatus::Done => Some("arkib"),
            RecordStatus::Failed => Some("errorArkib"),
        }
    }

    /// 从数据库 `status` 列解析状态
    pub fn from_column_value(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            None => Ok(RecordStatus::Pending),
            Some("inProgress") => Ok(RecordStatus::InProgress),
            Some("arkib") => Ok(RecordStatus::Done),
            Some("errorArkib") => Ok(RecordStatus::Failed),
            Some(other) => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "pending"),
            RecordStatus::InProgress => write!(f, "in_progress"),
            RecordStatus::Done => write!(f, "done"),
            RecordStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: RecordStatus,
        to: RecordStatus,
    },

    /// 无法识别的状态值
    #[error("Unknown record status: {0}")]
    UnknownStatus(String),
}

impl DomainRecord {
    /// 创建一条等待处理的记录
    pub fn pending(id: i64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            status: RecordStatus::Pending,
            result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// 认领记录
    ///
    /// 将状态从 Pending 变更为 InProgress
    ///
    /// # 返回值
    ///
    /// * `Ok(DomainRecord)` - 已认领的记录
    /// * `Err(DomainError)` - 记录已被其他处理者推进
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            RecordStatus::Pending => {
                self.status = RecordStatus::InProgress;
                self.started_at = Some(Utc::now().into());
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: RecordStatus::InProgress,
            }),
        }
    }

    /// 完成记录
    ///
    /// 将状态从 InProgress 变更为 Done 并保存分类结果
    pub fn complete(mut self, result: ClassificationResult) -> Result<Self, DomainError> {
        match self.status {
            RecordStatus::InProgress => {
                self.status = RecordStatus::Done;
                self.result = Some(result);
                self.error_message = None;
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: RecordStatus::Done,
            }),
        }
    }

    /// 标记记录失败
    ///
    /// 将状态从 InProgress 变更为 Failed 并保存错误信息
    pub fn fail(mut self, message: impl Into<String>) -> Result<Self, DomainError> {
        match self.status {
            RecordStatus::InProgress => {
                self.status = RecordStatus::Failed;
                self.result = None;
                self.error_message = Some(message.into());
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: RecordStatus::Failed,
            }),
        }
    }

    /// 重置被遗弃的记录
    ///
    /// 仅允许 InProgress → Pending，供外部修复流程使用
    pub fn reset(mut self) -> Result<Self, DomainError> {
        match self.status {
            RecordStatus::InProgress => {
                self.status = RecordStatus::Pending;
                self.started_at = None;
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: RecordStatus::Pending,
            }),
        }
    }
}

#[cfg(test)]
#[path = "domain_record_test.rs"]
mod tests;
