//! 配置管理模块
//!
//! 支持多层配置文件加载，环境变量覆盖，以及类型安全的配置访问。
//! 所有配置项都有默认值，没有任何配置文件时服务也能启动。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 跨域配置
///
/// `allowed_origins` 为空时允许任意来源。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_permissive(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub observability: ObservabilityConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置，环境由 RULE_ENV 指定）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（RULE_ 前缀，层级用 `__` 分隔，如 RULE_SERVER__PORT -> server.port）
    /// 5. 服务端口与跨域来源的快捷环境变量（如 RULE_SERVICE_PORT、RULE_CORS_ORIGINS）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULE_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("RULE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Some(port) = std::env::var(service_port_env_name(service_name))
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.server.port = port;
        }

        if let Ok(origins) = std::env::var("RULE_CORS_ORIGINS") {
            config.cors.allowed_origins = parse_origins(&origins);
        }

        Ok(config)
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// 服务端口环境变量名：rule-service -> RULE_SERVICE_PORT
fn service_port_env_name(service_name: &str) -> String {
    format!("{}_PORT", service_name.to_uppercase().replace('-', "_"))
}

/// 解析逗号分隔的来源列表，`*` 表示不限制
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(String::from)
        .collect()
}
