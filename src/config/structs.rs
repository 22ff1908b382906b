use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 配置文件默认路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 默认 HMAC 密钥，仅用于开发环境
pub const DEFAULT_SECRET_KEY: &str = "secret_key";

/// 兼容旧部署的扁平环境变量 -> 配置 key
const LEGACY_ENV_KEYS: [(&str, &str); 4] = [
    ("BASE_URL", "base_url"),
    ("FILE_STORAGE_PATH", "storage.file_storage_path"),
    ("DATABASE_DSN", "storage.database_dsn"),
    ("SECRET_KEY", "identity.secret_key"),
];

/// 存储后端类型，启动时一次性决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    File,
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relational => write!(f, "relational"),
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// 静态配置（启动时加载一次，之后只读）
///
/// 优先级：旧版扁平环境变量 > LV__ 环境变量 > config.toml > 默认值
/// ENV 前缀：LV，分隔符：__
/// 示例：LV__STORAGE__DATABASE_DSN=postgres://...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    /// 仅供调用方拼接完整短链，不参与地址生成
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub deletion: DeletionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 .env、config.toml 和环境变量加载配置
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 从指定 TOML 文件（可选）和环境变量加载配置
    pub fn load_from(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LV")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV_KEYS {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        let config = builder.build()?.try_deserialize::<StaticConfig>()?;
        Ok(config)
    }

    /// 后端选择：关系型 DSN > 文件路径 > 内存
    pub fn backend_kind(&self) -> BackendKind {
        if self.storage.database_dsn().is_some() {
            BackendKind::Relational
        } else if self.storage.file_storage_path().is_some() {
            BackendKind::File
        } else {
            BackendKind::Memory
        }
    }

    /// 拼接完整短链（base_url 与短链之间只保留一个 `/`）
    pub fn render_short_url(&self, short_link: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            short_link.trim_start_matches('/')
        )
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            storage: StorageConfig::default(),
            identity: IdentityConfig::default(),
            deletion: DeletionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub database_dsn: Option<String>,
    #[serde(default)]
    pub file_storage_path: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// 单条读写的超时
    #[serde(default = "default_point_timeout_secs")]
    pub point_timeout_secs: u64,
    /// 批量写入的超时
    #[serde(default = "default_batch_timeout_secs")]
    pub batch_timeout_secs: u64,
    #[serde(default)]
    pub sql_logging: bool,
}

impl StorageConfig {
    /// 空字符串视为未配置
    pub fn database_dsn(&self) -> Option<&str> {
        self.database_dsn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn file_storage_path(&self) -> Option<&str> {
        self.file_storage_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn point_timeout(&self) -> Duration {
        Duration::from_secs(self.point_timeout_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// 身份令牌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
}

impl IdentityConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// 批量删除工作池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionConfig {
    #[serde(default = "default_deletion_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_idle_timeout_secs() -> u64 {
    30
}

fn default_max_lifetime_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    8
}

fn default_point_timeout_secs() -> u64 {
    5
}

fn default_batch_timeout_secs() -> u64 {
    30
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_deletion_workers() -> usize {
    3
}

fn default_queue_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_dsn: None,
            file_storage_path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            point_timeout_secs: default_point_timeout_secs(),
            batch_timeout_secs: default_batch_timeout_secs(),
            sql_logging: false,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
        }
    }
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            workers: default_deletion_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
