use std::fmt;

/// 审计程序错误类型
#[derive(Debug)]
pub enum AuditError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 导出相关错误
    Export(ExportError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AuditError::Export(e) => write!(f, "导出错误: {}", e),
            AuditError::Config(e) => write!(f, "配置错误: {}", e),
            AuditError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuditError::Browser(e) => Some(e),
            AuditError::Export(e) => Some(e),
            AuditError::Config(e) => Some(e),
            AuditError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
///
/// 注意：定位策略找不到记录不算错误（返回空列表即可），
/// 这里只收「页面层面已经不可用」的失败。
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败（对当前任务是致命的，跳过该任务）
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 等待页面内容超时（可恢复，由调用方降级处理）
    WaitTimeout { what: String, timeout_secs: u64 },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
            BrowserError::WaitTimeout { what, timeout_secs } => {
                write!(f, "等待 {} 超时 ({} 秒)", what, timeout_secs)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::WaitTimeout { .. } => None,
        }
    }
}

/// 导出相关错误
#[derive(Debug)]
pub enum ExportError {
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 序列化失败
    SerializeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            ExportError::SerializeFailed { source } => {
                write!(f, "序列化失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::WriteFailed { source, .. } | ExportError::SerializeFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置值非法
    InvalidValue { field: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
            ConfigError::InvalidValue { field, value } => {
                write!(f, "配置项 {} 的值非法: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AuditError> for anyhow::Error，
// anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AuditError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AuditError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Export(ExportError::SerializeFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Export(ExportError::WriteFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AuditError {
    fn from(err: toml::de::Error) -> Self {
        AuditError::Config(ConfigError::FileParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AuditError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AuditError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AuditError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建等待超时错误
    pub fn wait_timeout(what: impl Into<String>, timeout_secs: u64) -> Self {
        AuditError::Browser(BrowserError::WaitTimeout {
            what: what.into(),
            timeout_secs,
        })
    }

    /// 创建文件写入错误
    pub fn export_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AuditError::Export(ExportError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 审计程序结果类型
pub type AuditResult<T> = Result<T, AuditError>;
