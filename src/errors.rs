use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkVaultError {
    NotFound(String),
    Deleted(String),
    /// 重复创建：携带已存在记录的短链
    AlreadyExists { short_link: String, message: String },
    BackendUnavailable(String),
    Timeout(String),
    InvalidToken(String),
    Unsupported(String),
    Config(String),
    DatabaseConfig(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Internal(String),
}

impl LinkVaultError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkVaultError::NotFound(_) => "E001",
            LinkVaultError::Deleted(_) => "E002",
            LinkVaultError::AlreadyExists { .. } => "E003",
            LinkVaultError::BackendUnavailable(_) => "E004",
            LinkVaultError::Timeout(_) => "E005",
            LinkVaultError::InvalidToken(_) => "E006",
            LinkVaultError::Unsupported(_) => "E007",
            LinkVaultError::Config(_) => "E008",
            LinkVaultError::DatabaseConfig(_) => "E009",
            LinkVaultError::DatabaseOperation(_) => "E010",
            LinkVaultError::FileOperation(_) => "E011",
            LinkVaultError::Serialization(_) => "E012",
            LinkVaultError::Internal(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkVaultError::NotFound(_) => "Link Not Found",
            LinkVaultError::Deleted(_) => "Link Deleted",
            LinkVaultError::AlreadyExists { .. } => "Link Already Exists",
            LinkVaultError::BackendUnavailable(_) => "Backend Unavailable",
            LinkVaultError::Timeout(_) => "Backend Timeout",
            LinkVaultError::InvalidToken(_) => "Invalid Token",
            LinkVaultError::Unsupported(_) => "Unsupported Operation",
            LinkVaultError::Config(_) => "Configuration Error",
            LinkVaultError::DatabaseConfig(_) => "Database Configuration Error",
            LinkVaultError::DatabaseOperation(_) => "Database Operation Error",
            LinkVaultError::FileOperation(_) => "File Operation Error",
            LinkVaultError::Serialization(_) => "Serialization Error",
            LinkVaultError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkVaultError::NotFound(msg)
            | LinkVaultError::Deleted(msg)
            | LinkVaultError::BackendUnavailable(msg)
            | LinkVaultError::Timeout(msg)
            | LinkVaultError::InvalidToken(msg)
            | LinkVaultError::Unsupported(msg)
            | LinkVaultError::Config(msg)
            | LinkVaultError::DatabaseConfig(msg)
            | LinkVaultError::DatabaseOperation(msg)
            | LinkVaultError::FileOperation(msg)
            | LinkVaultError::Serialization(msg)
            | LinkVaultError::Internal(msg) => msg,
            LinkVaultError::AlreadyExists { message, .. } => message,
        }
    }

    /// 格式化为彩色输出（用于启动失败时打印到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LinkVaultError::NotFound(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, LinkVaultError::Deleted(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LinkVaultError::AlreadyExists { .. })
    }

    /// 在原有信息前追加操作上下文，保留变体不变
    pub fn with_context(self, context: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", context, msg);
        match self {
            LinkVaultError::NotFound(m) => LinkVaultError::NotFound(wrap(m)),
            LinkVaultError::Deleted(m) => LinkVaultError::Deleted(wrap(m)),
            LinkVaultError::AlreadyExists {
                short_link,
                message,
            } => LinkVaultError::AlreadyExists {
                short_link,
                message: wrap(message),
            },
            LinkVaultError::BackendUnavailable(m) => LinkVaultError::BackendUnavailable(wrap(m)),
            LinkVaultError::Timeout(m) => LinkVaultError::Timeout(wrap(m)),
            LinkVaultError::InvalidToken(m) => LinkVaultError::InvalidToken(wrap(m)),
            LinkVaultError::Unsupported(m) => LinkVaultError::Unsupported(wrap(m)),
            LinkVaultError::Config(m) => LinkVaultError::Config(wrap(m)),
            LinkVaultError::DatabaseConfig(m) => LinkVaultError::DatabaseConfig(wrap(m)),
            LinkVaultError::DatabaseOperation(m) => LinkVaultError::DatabaseOperation(wrap(m)),
            LinkVaultError::FileOperation(m) => LinkVaultError::FileOperation(wrap(m)),
            LinkVaultError::Serialization(m) => LinkVaultError::Serialization(wrap(m)),
            LinkVaultError::Internal(m) => LinkVaultError::Internal(wrap(m)),
        }
    }
}

impl fmt::Display for LinkVaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkVaultError {}

// 便捷的构造函数
impl LinkVaultError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::NotFound(msg.into())
    }

    pub fn deleted<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Deleted(msg.into())
    }

    pub fn already_exists<S: Into<String>, T: Into<String>>(short_link: S, msg: T) -> Self {
        LinkVaultError::AlreadyExists {
            short_link: short_link.into(),
            message: msg.into(),
        }
    }

    pub fn backend_unavailable<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::BackendUnavailable(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Timeout(msg.into())
    }

    pub fn invalid_token<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::InvalidToken(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Unsupported(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DatabaseConfig(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Serialization(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        LinkVaultError::Internal(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkVaultError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                LinkVaultError::BackendUnavailable(err.to_string())
            }
            _ => LinkVaultError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LinkVaultError {
    fn from(err: std::io::Error) -> Self {
        LinkVaultError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkVaultError {
    fn from(err: serde_json::Error) -> Self {
        LinkVaultError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for LinkVaultError {
    fn from(err: hex::FromHexError) -> Self {
        LinkVaultError::InvalidToken(format!("token is not valid hex: {}", err))
    }
}

impl From<config::ConfigError> for LinkVaultError {
    fn from(err: config::ConfigError) -> Self {
        LinkVaultError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkVaultError>;
