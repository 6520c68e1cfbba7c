// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::classification::{ClassificationResult, SignalConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

static CONTACT_LINK_REGEX: Lazy<Regex> = Lazy::new(|| link_pattern(LinkCategory::Contact));

static FAQ_LINK_REGEX: Lazy<Regex> = Lazy::new(|| link_pattern(LinkCategory::Faq));

/// 链接分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCategory {
    /// 联系我们页面
    Contact,
    /// 常见问题页面
    Faq,
}

impl LinkCategory {
    /// 链接中需要出现的关键字（大小写不敏感）
    pub fn marker(&self) -> &'static str {
        match self {
            LinkCategory::Contact => "contact",
            LinkCategory::Faq => "faq",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            LinkCategory::Contact => &CONTACT_LINK_REGEX,
            LinkCategory::Faq => &FAQ_LINK_REGEX,
        }
    }
}

// A URL token ends at whitespace or a quote character.
fn link_pattern(category: LinkCategory) -> Regex {
    let pattern = format!(
        r#"(?i)https?://[^\s"']*{}[^\s"']*"#,
        regex::escape(category.marker())
    );
    Regex::new(&pattern).expect("valid link pattern")
}

/// 信号提取器
///
/// 纯函数式的页面内容分类器：不做任何 I/O，不持有状态，永不失败。
/// 正则在首次使用时编译一次，之后在所有调用间复用；
/// `regex` 保证线性时间匹配，多 MB 的页面也能在有限时间内完成。
pub struct SignalExtractor;

impl SignalExtractor {
    /// 对页面内容进行分类
    ///
    /// # 参数
    ///
    /// * `body` - 抓取到的原始文本
    /// * `config` - 信号配置
    ///
    /// # 返回值
    ///
    /// 分类结果；没有任何命中时所有列表为空且 `matched` 为 false
    pub fn classify(body: &str, config: &SignalConfig) -> ClassificationResult {
        let lower_body = body.to_lowercase();

        let frameworks = Self::find_signals(&lower_body, &config.frameworks);
        let help_desks = Self::find_signals(&lower_body, &config.help_desks);
        let emails = Self::extract_emails(body);
        let contact_page_links = Self::extract_links(body, LinkCategory::Contact);
        let faq_page_links = Self::extract_links(body, LinkCategory::Faq);

        ClassificationResult::from_parts(
            frameworks,
            help_desks,
            emails,
            contact_page_links,
            faq_page_links,
        )
    }

    /// 大小写不敏感的子串匹配
    ///
    /// `lower_body` 必须已经转换为小写。返回配置中的原始写法。
    pub fn find_signals(lower_body: &str, signals: &[String]) -> Vec<String> {
        dedup_in_order(
            signals
                .iter()
                .filter(|signal| lower_body.contains(&signal.to_lowercase()))
                .map(String::as_str),
        )
    }

    /// 提取邮箱地址，保留原始大小写
    pub fn extract_emails(body: &str) -> Vec<String> {
        dedup_in_order(EMAIL_REGEX.find_iter(body).map(|m| m.as_str()))
    }

    /// 提取包含分类关键字的绝对链接
    ///
    /// 同一个链接可能同时属于多个分类。
    pub fn extract_links(body: &str, category: LinkCategory) -> Vec<String> {
        dedup_in_order(category.regex().find_iter(body).map(|m| m.as_str()))
    }
}

fn dedup_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "signal_extractor_test.rs"]
mod tests;
