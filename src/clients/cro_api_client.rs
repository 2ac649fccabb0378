//! 结构化查询客户端
//!
//! 带 Basic-Auth 的 REST 接口：`GET {base}?company_num=..&company_bus_ind=..&max=..&format=json`

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::RegistryClient;
use crate::config::{Config, Credentials};
use crate::error::{AppResult, ConfigError};
use crate::models::{CroCompanyPayload, EntityTypeFilter, Identifier, RawOutcome, RegistryRecord};

/// CRO 结构化查询客户端
pub struct CroApiClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    result_limit: u32,
    split_either: bool,
    timeout_secs: u64,
}

impl CroApiClient {
    /// 创建客户端；缺少凭据时在发出任何请求之前报错
    pub fn new(config: &Config, credentials: Option<Credentials>) -> AppResult<Self> {
        let credentials = credentials.ok_or(ConfigError::MissingCredentials)?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            credentials,
            result_limit: config.result_limit.max(1),
            split_either: config.split_either_queries,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// 使用配置中的凭据创建
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config, config.credentials())
    }

    fn describe_request_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("Request timed out after {}s", self.timeout_secs)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            format!("Request failed: {}", err)
        }
    }

    /// 解析 200 响应体：空数组 / null / 空白 → Empty
    fn parse_body(body: &str, filter: EntityTypeFilter) -> RawOutcome {
        if body.trim().is_empty() {
            return RawOutcome::Empty;
        }

        let value: JsonValue = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => return RawOutcome::Exception(format!("Invalid response payload: {}", e)),
        };

        let payloads: Result<Vec<CroCompanyPayload>, serde_json::Error> = match value {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(_) => serde_json::from_value(value),
            JsonValue::Object(_) => serde_json::from_value(value).map(|p| vec![p]),
            other => {
                return RawOutcome::Exception(format!("Unexpected response payload: {}", other));
            }
        };

        let records: Vec<RegistryRecord> = match payloads {
            Ok(payloads) => payloads
                .into_iter()
                .map(RegistryRecord::from)
                .filter(|r| r.business_indicator.map_or(true, |i| filter.accepts(i)))
                .collect(),
            Err(e) => return RawOutcome::Exception(format!("Invalid response payload: {}", e)),
        };

        if records.is_empty() {
            RawOutcome::Empty
        } else {
            RawOutcome::Records(records)
        }
    }
}

#[async_trait]
impl RegistryClient for CroApiClient {
    fn name(&self) -> &'static str {
        "CRO 结构化查询"
    }

    fn sub_queries(&self, filter: EntityTypeFilter) -> Vec<EntityTypeFilter> {
        match filter {
            EntityTypeFilter::Either if self.split_either => {
                vec![EntityTypeFilter::Company, EntityTypeFilter::Business]
            }
            other => vec![other],
        }
    }

    async fn query(&self, identifier: &Identifier, filter: EntityTypeFilter) -> RawOutcome {
        let max = self.result_limit.to_string();
        debug!("查询 {} (company_bus_ind={}, max={})", identifier, filter.code(), max);

        let response = match self
            .http
            .get(&self.base_url)
            .basic_auth(
                &self.credentials.identity,
                Some(self.credentials.secret.expose_secret()),
            )
            .header("Accept", "application/json")
            .query(&[
                ("company_num", identifier.as_str()),
                ("company_bus_ind", filter.code()),
                ("max", max.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("请求 {} 失败: {}", identifier, e);
                return RawOutcome::Exception(self.describe_request_error(&e));
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return RawOutcome::AuthError(format!("HTTP {}", status.as_u16()));
        }
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return RawOutcome::http(status.as_u16(), reason);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return RawOutcome::Exception(self.describe_request_error(&e)),
        };
        debug!("{} 响应长度: {} 字节", identifier, body.len());

        Self::parse_body(&body, filter)
    }
}
