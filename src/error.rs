use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 只有"整批/整轮中止"级别的错误才会以 `AppError` 的形式向上传播，
/// 单个任务的抓取失败由 [`FetchError`] 表示，并被转换为 `Failure` 结果。
#[derive(Debug)]
pub enum AppError {
    /// 浏览器 / 会话相关错误
    Browser(BrowserError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 工作池错误
    Pool(PoolError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Pool(e) => write!(f, "工作池错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Pool(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 无法为会话分配独立的工作目录
    WorkspaceUnavailable { source: std::io::Error },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::WorkspaceUnavailable { source } => {
                write!(f, "无法创建会话工作目录: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::WorkspaceUnavailable { source } => Some(source),
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 解析文件内容失败（JSON / TOML）
    ParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录无法创建或不可写
    DirectoryUnavailable {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::ParseFailed { path, source } => {
                write!(f, "解析文件失败 ({}): {}", path, source)
            }
            FileError::DirectoryUnavailable { path, source } => {
                write!(f, "目录不可用 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::ParseFailed { source, .. }
            | FileError::DirectoryUnavailable { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 取值不合法
    InvalidValue { field: String, reason: String },
    /// 索引范围越界
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    /// 未知的抽取模板
    UnknownSchema { name: String },
    /// 选择器或正则无法编译
    InvalidSelector { schema: String, selector: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "配置项 {} 不合法: {}", field, reason)
            }
            ConfigError::RangeOutOfBounds { start, end, len } => {
                write!(f, "索引范围 [{}, {}) 超出链接列表长度 {}", start, end, len)
            }
            ConfigError::UnknownSchema { name } => {
                write!(f, "未知的抽取模板: {}", name)
            }
            ConfigError::InvalidSelector {
                schema,
                selector,
                reason,
            } => {
                write!(f, "模板 {} 中的选择器 '{}' 无效: {}", schema, selector, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 工作池错误
#[derive(Debug)]
pub enum PoolError {
    /// 并发许可无法获取（信号量已关闭）
    PermitUnavailable { reason: String },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::PermitUnavailable { reason } => {
                write!(f, "无法获取并发许可: {}", reason)
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// 单个任务的抓取失败原因
///
/// 除 `SessionSetup` 外都只影响当前任务。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("等待页面就绪超时 ({secs}s)")]
    Timeout { secs: u64 },

    #[error("页面渲染内容为空")]
    EmptyContent,

    #[error("渲染器异常: {reason}")]
    RendererCrash { reason: String },

    #[error("无法创建会话工作目录: {source}")]
    SessionSetup {
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn crash(reason: impl fmt::Display) -> Self {
        FetchError::RendererCrash {
            reason: reason.to_string(),
        }
    }

    /// 是否属于环境/资源级别的错误，需要中止整批
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::SessionSetup { .. })
    }
}

// ========== 从常见错误类型转换 ==========

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::SessionSetup { source } => {
                AppError::Browser(BrowserError::WorkspaceUnavailable { source })
            }
            other => AppError::Other(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件解析错误
    pub fn file_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建目录不可用错误
    pub fn directory_unavailable(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::DirectoryUnavailable {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置项不合法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
