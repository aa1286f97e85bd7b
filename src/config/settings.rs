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

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、服务与日志三部分配置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务配置
    pub service: ServiceSettings,
    /// 日志配置
    pub telemetry: TelemetrySettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL，`postgres://` 或 `sqlite:` 开头
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 连接后是否执行迁移
    #[serde(default)]
    pub run_migrations: bool,
}

/// 服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    /// 单次仓库调用的时限（毫秒）
    pub operation_timeout_ms: u64,
}

impl ServiceSettings {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 5000,
        }
    }
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// `RUST_LOG` 未设置时使用的过滤规则
    pub filter: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            filter: "info,ratingrs=debug".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default.toml`、`config/{APP_ENVIRONMENT}.toml`、
    /// 以 `RATINGRS__` 为前缀的环境变量（如 `RATINGRS__DATABASE__URL`）。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("RATINGRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 只含内置默认值的构建器
    pub fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.url", "sqlite://ratingrs.db?mode=rwc")?
            // Default DB pool settings
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.run_migrations", true)?
            .set_default("service.operation_timeout_ms", 5000)?
            .set_default("telemetry.filter", "info,ratingrs=debug")?
            .set_default("telemetry.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
