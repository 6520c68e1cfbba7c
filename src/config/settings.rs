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

use crate::domain::models::classification::SignalConfig;
use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、扫描器、信号列表和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 扫描器配置
    pub scanner: ScannerSettings,
    /// 信号列表配置
    pub signals: SignalSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
///
/// 可以直接给出 `url`，也可以给出主机、端口、账号和库名由程序拼接。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: Option<String>,
    /// 主机
    pub host: Option<String>,
    /// 端口
    pub port: Option<u16>,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub password: Option<String>,
    /// 库名
    pub name: Option<String>,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时是否执行迁移，既有表只会补齐缺失的列
    #[serde(default)]
    pub run_migrations: bool,
}

/// 扫描器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSettings {
    /// 每轮认领数量，同时也是并发上限
    pub batch_size: usize,
    /// 没有待处理记录时的等待时间（秒）
    pub idle_interval_secs: u64,
    /// 单次抓取超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 抓取使用的 User-Agent
    pub user_agent: String,
    /// 启动时把处理时间超过该值的 InProgress 记录重置为 Pending（秒）
    pub reset_stale_after_secs: Option<u64>,
}

/// 信号列表配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalSettings {
    /// 框架信号
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// 客服系统信号
    #[serde(default)]
    pub help_desks: Vec<String>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("DB_HOST", "SIGNALSCAN__DATABASE__HOST"),
    ("DB_PORT", "SIGNALSCAN__DATABASE__PORT"),
    ("DB_USER", "SIGNALSCAN__DATABASE__USER"),
    ("DB_PASSWORD", "SIGNALSCAN__DATABASE__PASSWORD"),
    ("DB_NAME", "SIGNALSCAN__DATABASE__NAME"),
    ("MAX_CONCURRENT_TASKS", "SIGNALSCAN__SCANNER__BATCH_SIZE"),
    ("FRAMEWORKS", "SIGNALSCAN__SIGNALS__FRAMEWORKS"),
    ("HELP_DESKS", "SIGNALSCAN__SIGNALS__HELP_DESKS"),
];

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// 加载或反序列化失败
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    /// 配置值不合法
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次合并内置默认值、`config/default.toml`、`config/{APP_ENVIRONMENT}.toml`
    /// 和以 `SIGNALSCAN` 为前缀的环境变量，然后校验。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(SettingsError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Self::legacy_environment(std::env::vars()))
            .add_source(Self::environment());

        Self::from_config(builder.build()?)
    }

    /// 内置默认值
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default DB pool settings
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.run_migrations", true)?
            // Default scanner settings
            .set_default("scanner.batch_size", SignalConfig::DEFAULT_BATCH_SIZE as u64)?
            .set_default("scanner.idle_interval_secs", 10)?
            .set_default("scanner.fetch_timeout_secs", 30)?
            .set_default(
                "scanner.user_agent",
                crate::engines::reqwest_engine::DEFAULT_USER_AGENT,
            )?
            // Signal lists are empty unless configured
            .set_default("signals.frameworks", Vec::<String>::new())?
            .set_default("signals.help_desks", Vec::<String>::new())?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 环境变量来源
    ///
    /// 例如 `SIGNALSCAN__SCANNER__BATCH_SIZE=8`，
    /// 列表用逗号分隔：`SIGNALSCAN__SIGNALS__FRAMEWORKS=react,vue`。
    pub fn environment() -> Environment {
        Environment::with_prefix("SIGNALSCAN")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("signals.frameworks")
            .with_list_parse_key("signals.help_desks")
            .try_parsing(true)
    }

    /// 旧部署使用的环境变量
    ///
    /// `DB_HOST`、`FRAMEWORKS`、`MAX_CONCURRENT_TASKS` 等名称被映射到对应的配置键，
    /// 优先级低于 `SIGNALSCAN__*` 变量。空值会被忽略。
    pub fn legacy_environment(vars: impl IntoIterator<Item = (String, String)>) -> Environment {
        let map: Map<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(name, value)| {
                LEGACY_ENV_KEYS
                    .iter()
                    .find(|(legacy, _)| *legacy == name)
                    .map(|(_, key)| (key.to_string(), value))
            })
            .collect();

        Self::environment().source(Some(map))
    }

    /// 反序列化并校验
    pub fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.scanner.batch_size == 0 {
            return Err(SettingsError::Invalid(
                "scanner.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.scanner.fetch_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "scanner.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.database.connection_url()?;
        Ok(())
    }

    /// 信号配置
    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig::new(
            self.signals.frameworks.clone(),
            self.signals.help_desks.clone(),
            self.scanner.batch_size,
        )
    }
}

impl ScannerSettings {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl DatabaseSettings {
    /// 数据库连接URL
    ///
    /// 优先使用 `url`；否则用 host/port/user/password/name 拼接 MySQL URL。
    pub fn connection_url(&self) -> Result<String, SettingsError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        let (host, name) = match (self.host.as_deref(), self.name.as_deref()) {
            (Some(host), Some(name)) => (host, name),
            _ => {
                return Err(SettingsError::Invalid(
                    "database.url or database.host and database.name must be set".to_string(),
                ))
            }
        };

        let credentials = match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            _ => String::new(),
        };

        Ok(format!(
            "mysql://{}{}:{}/{}",
            credentials,
            host,
            self.port.unwrap_or(3306),
            name
        ))
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
