use crate::error::{AppResult, ConfigError};
use crate::models::EntityTypeFilter;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "cro_lookup.toml";

/// 数据源传输策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStrategy {
    /// 带认证的 REST 接口
    #[default]
    #[serde(alias = "api", alias = "StructuredQuery")]
    StructuredQuery,
    /// 浏览器自动化抓取搜索页
    #[serde(alias = "Scrape")]
    Scrape,
}

impl FromStr for TransportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured_query" | "structuredquery" | "api" => Ok(TransportStrategy::StructuredQuery),
            "scrape" | "browser" => Ok(TransportStrategy::Scrape),
            other => Err(format!("未知的传输策略: {}", other)),
        }
    }
}

/// 访问注册处接口的凭据
#[derive(Clone, Debug)]
pub struct Credentials {
    pub identity: String,
    pub secret: Secret<String>,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: Secret::new(secret.into()),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 实体类型过滤器
    pub entity_type_filter: EntityTypeFilter,
    /// 传输策略
    pub transport_strategy: TransportStrategy,
    /// 结构化查询接口地址
    pub api_base_url: String,
    /// 搜索页地址（抓取策略）
    pub search_page_url: String,
    /// 每次查询返回的最大记录数（`max` 参数）
    pub result_limit: u32,
    /// Either 是否拆成 Company + Business 两次查询
    pub split_either_queries: bool,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 抓取时等待页面元素的超时（秒）
    pub scrape_wait_secs: u64,
    /// 相邻两次查询之间的间隔（毫秒）
    pub request_delay_ms: u64,
    /// 可重试失败的最大重试次数
    pub max_retries: usize,
    /// 重试基础间隔（毫秒），按尝试次数线性增长
    pub retry_delay_ms: u64,
    /// 已打开浏览器的调试端口；为空时启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 直接输入的编号文本
    pub input_text: Option<String>,
    /// 上传的 CSV 文件
    pub input_file: Option<String>,
    /// CSV 中编号所在列
    pub input_column: Option<String>,
    /// 结果 CSV 输出路径
    pub output_csv: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 凭据 ---
    pub api_identity: Option<String>,
    pub api_key: Option<Secret<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entity_type_filter: EntityTypeFilter::Either,
            transport_strategy: TransportStrategy::StructuredQuery,
            api_base_url: "https://services.cro.ie/cws/companies".to_string(),
            search_page_url: "https://core.cro.ie/search".to_string(),
            result_limit: 1,
            split_either_queries: true,
            request_timeout_secs: 15,
            scrape_wait_secs: 10,
            request_delay_ms: 250,
            max_retries: 2,
            retry_delay_ms: 1000,
            browser_debug_port: None,
            chrome_executable: None,
            input_text: None,
            input_file: None,
            input_column: None,
            output_csv: "entity_results.csv".to_string(),
            verbose_logging: false,
            api_identity: None,
            api_key: None,
        }
    }
}

impl Config {
    /// 加载配置：配置文件 + 环境变量覆盖
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 同 [`Config::load`]，`lookup` 替代进程环境
    ///
    /// # 参数
    /// - `lookup`: 按变量名取值
    ///
    /// # 返回
    /// 显式指定的 `CRO_CONFIG_FILE` 不存在时报错；
    /// 未指定时默认文件可有可无
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let base = match lookup("CRO_CONFIG_FILE") {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content, path)
    }

    /// 解析 TOML 配置，未出现的字段取默认值
    pub fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    /// 用 `CRO_*` 变量覆盖配置；`lookup` 便于测试时替换环境
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(v) = lookup("CRO_ENTITY_TYPE") {
            self.entity_type_filter =
                EntityTypeFilter::parse(&v).ok_or_else(|| parse_error("CRO_ENTITY_TYPE", &v, "Company|Business|Either"))?;
        }
        if let Some(v) = lookup("CRO_TRANSPORT") {
            self.transport_strategy = v
                .parse()
                .map_err(|_| parse_error("CRO_TRANSPORT", &v, "StructuredQuery|Scrape"))?;
        }
        if let Some(v) = lookup("CRO_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("CRO_SEARCH_PAGE_URL") {
            self.search_page_url = v;
        }
        parse_into(&lookup, "CRO_RESULT_LIMIT", "u32", &mut self.result_limit)?;
        parse_into(&lookup, "CRO_SPLIT_EITHER", "bool", &mut self.split_either_queries)?;
        parse_into(&lookup, "CRO_REQUEST_TIMEOUT_SECS", "u64", &mut self.request_timeout_secs)?;
        parse_into(&lookup, "CRO_SCRAPE_WAIT_SECS", "u64", &mut self.scrape_wait_secs)?;
        parse_into(&lookup, "CRO_REQUEST_DELAY_MS", "u64", &mut self.request_delay_ms)?;
        parse_into(&lookup, "CRO_MAX_RETRIES", "usize", &mut self.max_retries)?;
        parse_into(&lookup, "CRO_RETRY_DELAY_MS", "u64", &mut self.retry_delay_ms)?;
        parse_into(&lookup, "VERBOSE_LOGGING", "bool", &mut self.verbose_logging)?;
        if let Some(v) = lookup("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = Some(v.parse().map_err(|_| parse_error("BROWSER_DEBUG_PORT", &v, "u16"))?);
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("CRO_INPUT_TEXT") {
            self.input_text = Some(v);
        }
        if let Some(v) = lookup("CRO_INPUT_FILE") {
            self.input_file = Some(v);
        }
        if let Some(v) = lookup("CRO_INPUT_COLUMN") {
            self.input_column = Some(v);
        }
        if let Some(v) = lookup("CRO_OUTPUT_CSV") {
            self.output_csv = v;
        }
        if let Some(v) = lookup("CRO_API_IDENTITY") {
            self.api_identity = Some(v);
        }
        if let Some(v) = lookup("CRO_API_KEY") {
            self.api_key = Some(Secret::new(v));
        }
        Ok(self)
    }

    /// 凭据完整（两项都非空）时才返回
    pub fn credentials(&self) -> Option<Credentials> {
        let identity = self.api_identity.as_deref()?.trim();
        let secret = self.api_key.as_ref()?.expose_secret().trim();
        if identity.is_empty() || secret.is_empty() {
            return None;
        }
        Some(Credentials::new(identity, secret))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn scrape_wait(&self) -> Duration {
        Duration::from_secs(self.scrape_wait_secs)
    }
}

fn parse_error(var_name: &str, value: &str, expected_type: &str) -> ConfigError {
    ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    }
}

fn parse_into<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    target: &mut T,
) -> AppResult<()> {
    if let Some(v) = lookup(var_name) {
        *target = v
            .trim()
            .parse()
            .map_err(|_| parse_error(var_name, &v, expected_type))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.entity_type_filter, EntityTypeFilter::Either);
        assert_eq!(config.transport_strategy, TransportStrategy::StructuredQuery);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("CRO_ENTITY_TYPE", "company"),
                ("CRO_TRANSPORT", "scrape"),
                ("CRO_MAX_RETRIES", "0"),
                ("CRO_API_IDENTITY", "user@example.com"),
                ("CRO_API_KEY", "s3cret"),
            ]))
            .unwrap();

        assert_eq!(config.entity_type_filter, EntityTypeFilter::Company);
        assert_eq!(config.transport_strategy, TransportStrategy::Scrape);
        assert_eq!(config.max_retries, 0);
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.identity, "user@example.com");
        assert_eq!(credentials.secret.expose_secret(), "s3cret");
    }

    #[test]
    fn test_bad_env_value() {
        let err = Config::default()
            .with_overrides(lookup_from(&[("CRO_REQUEST_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("CRO_REQUEST_DELAY_MS"));
    }

    #[test]
    fn test_blank_credentials_are_missing() {
        let config = Config::default()
            .with_overrides(lookup_from(&[("CRO_API_IDENTITY", "me"), ("CRO_API_KEY", "  ")]))
            .unwrap();
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            entity_type_filter = "business"
            transport_strategy = "scrape"
            request_delay_ms = 0
            output_csv = "out.csv"
            "#,
            "cro_lookup.toml",
        )
        .unwrap();
        assert_eq!(config.entity_type_filter, EntityTypeFilter::Business);
        assert_eq!(config.transport_strategy, TransportStrategy::Scrape);
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.output_csv, "out.csv");
        assert_eq!(config.scrape_wait_secs, 10);
    }

    #[test]
    fn test_explicit_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let missing = missing.to_string_lossy();

        let err = Config::load_with(lookup_from(&[("CRO_CONFIG_FILE", &*missing)])).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::File(crate::error::FileError::ReadFailed { .. })
        ));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_explicit_config_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookup.toml");
        std::fs::write(&path, "transport_strategy = \"scrape\"\nmax_retries = 5\n").unwrap();
        let path = path.to_string_lossy();

        let config = Config::load_with(lookup_from(&[
            ("CRO_CONFIG_FILE", &*path),
            ("CRO_MAX_RETRIES", "1"),
        ]))
        .unwrap();
        assert_eq!(config.transport_strategy, TransportStrategy::Scrape);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("me", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
