use thiserror::Error;

/// 应用程序错误类型
///
/// 只有会中断整次查询的错误才出现在这里；单个编号的查询失败
/// 由 [`crate::models::RawOutcome`] 表达，最终变成结果表中的一行。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 输入错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 规范化之后没有任何可用编号
    #[error("no identifiers supplied")]
    NoIdentifiers,
    /// CSV 中找不到指定的列
    #[error("CSV 中不存在列 '{column}'")]
    ColumnNotFound { column: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 结构化查询策略缺少凭据
    #[error("结构化查询需要凭据 (CRO_API_IDENTITY / CRO_API_KEY)")]
    MissingCredentials,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {0}")]
    LaunchFailed(#[source] chromiumoxide::error::CdpError),
    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(#[source] chromiumoxide::error::CdpError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// CSV 读写失败
    #[error("CSV 处理失败 ({path}): {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 CSV 错误
    pub fn csv(path: impl Into<String>, source: csv::Error) -> Self {
        AppError::File(FileError::Csv {
            path: path.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否属于“阻断型”错误（查询尚未开始）
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppError::Input(_) | AppError::Config(ConfigError::MissingCredentials)
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_errors() {
        assert!(AppError::from(InputError::NoIdentifiers).is_blocking());
        assert!(AppError::from(ConfigError::MissingCredentials).is_blocking());
        assert!(!AppError::from(BrowserError::ConfigurationFailed("x".into())).is_blocking());
    }

    #[test]
    fn test_no_identifiers_message() {
        let err = AppError::from(InputError::NoIdentifiers);
        assert_eq!(err.to_string(), "输入错误: no identifiers supplied");
    }
}
