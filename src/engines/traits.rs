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

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 抓取失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// 超时
    Timeout,
    /// 无法建立连接
    ConnectionFailed,
    /// 服务器返回非 2xx 状态码
    HttpStatus(u16),
    /// 其他错误
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "timeout"),
            FetchErrorKind::ConnectionFailed => write!(f, "connection failed"),
            FetchErrorKind::HttpStatus(code) => write!(f, "http status {}", code),
            FetchErrorKind::Other => write!(f, "other"),
        }
    }
}

/// 抓取错误
///
/// `Display` 输出即写入记录的错误信息，其中包含失败类别。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    /// 失败类别
    pub kind: FetchErrorKind,
    /// 详细信息
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::ConnectionFailed, message)
    }

    pub fn http_status(code: u16) -> Self {
        Self::new(
            FetchErrorKind::HttpStatus(code),
            format!("Request failed with status code {}", code),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Other, message)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::connection_failed(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::http_status(status.as_u16())
        } else {
            FetchError::other(err.to_string())
        }
    }
}

/// 页面抓取特质
///
/// 给定URL，在超时时间内返回响应正文或带类别的错误。
/// 实现方不做重试。
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).fetch(url, timeout).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
