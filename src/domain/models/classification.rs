// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 分类结果
///
/// 对一次抓取到的页面内容进行信号提取后的结构化输出。
/// 所有列表均已去重，并保持首次出现的顺序。
///
/// 序列化时使用 camelCase 字段名，与 `data` 列中既有的 JSON 格式保持一致。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// 任意一个列表非空时为 true
    pub matched: bool,
    /// 命中的前端框架信号
    pub frameworks: Vec<String>,
    /// 命中的客服系统信号
    pub help_desks: Vec<String>,
    /// 页面中出现的邮箱地址
    pub emails: Vec<String>,
    /// 指向联系页面的绝对链接
    pub contact_page_links: Vec<String>,
    /// 指向常见问题页面的绝对链接
    pub faq_page_links: Vec<String>,
}

impl ClassificationResult {
    /// 根据五个列表计算 `matched` 并构建结果
    pub fn from_parts(
        frameworks: Vec<String>,
        help_desks: Vec<String>,
        emails: Vec<String>,
        contact_page_links: Vec<String>,
        faq_page_links: Vec<String>,
    ) -> Self {
        let matched = !frameworks.is_empty()
            || !help_desks.is_empty()
            || !emails.is_empty()
            || !contact_page_links.is_empty()
            || !faq_page_links.is_empty();

        Self {
            matched,
            frameworks,
            help_desks,
            emails,
            contact_page_links,
            faq_page_links,
        }
    }
}

/// 信号配置
///
/// 启动时加载一次，之后只读并在各处理任务间共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalConfig {
    /// 框架信号列表
    pub frameworks: Vec<String>,
    /// 客服系统信号列表
    pub help_desks: Vec<String>,
    /// 每轮认领的记录数，同时也是并发上限
    pub batch_size: usize,
}

impl SignalConfig {
    /// 默认批次大小
    pub const DEFAULT_BATCH_SIZE: usize = 5;

    /// 创建信号配置
    ///
    /// 信号会去掉首尾空白，空字符串会被丢弃（空串是任何文本的子串）。
    /// `batch_size` 为 0 时回退到默认值。
    pub fn new(frameworks: Vec<String>, help_desks: Vec<String>, batch_size: usize) -> Self {
        Self {
            frameworks: normalize_signals(frameworks),
            help_desks: normalize_signals(help_desks),
            batch_size: if batch_size == 0 {
                Self::DEFAULT_BATCH_SIZE
            } else {
                batch_size
            },
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Self::DEFAULT_BATCH_SIZE)
    }
}

fn normalize_signals(signals: Vec<String>) -> Vec<String> {
    signals
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
