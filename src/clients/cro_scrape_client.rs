//! 页面抓取客户端
//!
//! 在浏览器会话中打开 CRO 搜索页，输入编号并回车，等待结果或"无结果"状态，
//! 取第一条结果的名称。

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::RegistryClient;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{EntityTypeFilter, Identifier, RawOutcome, RegistryRecord};

/// 搜索输入框
pub const SEARCH_FIELD_SELECTOR: &str = "#search-field";
/// 第一条结果的名称
pub const RESULT_NAME_SELECTOR: &str = ".result-body .company-name";
/// "无结果" 提示
pub const NO_RESULTS_SELECTOR: &str = ".no-results, .search-no-results";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 搜索页当前状态
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PageState {
    Found { name: String },
    Empty,
    Pending,
}

/// CRO 搜索页抓取客户端
pub struct CroScrapeClient {
    executor: JsExecutor,
    search_url: String,
    wait: Duration,
    call_timeout: Duration,
}

impl CroScrapeClient {
    /// `executor` 持有会话中的页面，会话的获取和释放由调用方负责
    pub fn new(executor: JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            search_url: config.search_page_url.clone(),
            wait: config.scrape_wait(),
            call_timeout: config.request_timeout(),
        }
    }

    async fn search(&self, identifier: &Identifier) -> Result<RawOutcome> {
        self.executor.goto(&self.search_url).await?;

        let field_ready = self
            .executor
            .poll_until(&search_field_js(), self.wait, POLL_INTERVAL, |present: &bool| *present)
            .await?;
        if field_ready.is_none() {
            debug!("{} 等待搜索框超时", identifier);
            return Ok(RawOutcome::Empty);
        }

        self.executor
            .type_and_submit(SEARCH_FIELD_SELECTOR, identifier.as_str())
            .await?;

        let state = self
            .executor
            .poll_until(&result_state_js(), self.wait, POLL_INTERVAL, |s: &PageState| {
                *s != PageState::Pending
            })
            .await?;

        Ok(outcome_from_state(identifier, state))
    }
}

/// 页面最终状态 → 原始结果；等待超时（None）或仍在加载都算未找到
fn outcome_from_state(identifier: &Identifier, state: Option<PageState>) -> RawOutcome {
    match state {
        Some(PageState::Found { name }) => {
            RawOutcome::Records(vec![RegistryRecord::name_only(identifier.as_str(), name)])
        }
        Some(PageState::Empty) | Some(PageState::Pending) | None => RawOutcome::Empty,
    }
}

/// 带超时的一次抓取 → 原始结果：超时算未找到，自动化失败算异常
fn outcome_from_attempt(
    identifier: &Identifier,
    attempt: Result<Result<RawOutcome>, Elapsed>,
) -> RawOutcome {
    match attempt {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!("抓取 {} 失败: {:#}", identifier, e);
            RawOutcome::Exception(format!("Browser automation failed: {}", e))
        }
        Err(_) => {
            debug!("抓取 {} 超时", identifier);
            RawOutcome::Empty
        }
    }
}

#[async_trait]
impl RegistryClient for CroScrapeClient {
    fn name(&self) -> &'static str {
        "CRO 搜索页抓取"
    }

    /// 搜索页没有类型过滤，只发一次
    fn sub_queries(&self, _filter: EntityTypeFilter) -> Vec<EntityTypeFilter> {
        vec![EntityTypeFilter::Either]
    }

    async fn query(&self, identifier: &Identifier, _filter: EntityTypeFilter) -> RawOutcome {
        let attempt = timeout(self.call_timeout, self.search(identifier)).await;
        outcome_from_attempt(identifier, attempt)
    }
}

fn search_field_js() -> String {
    format!("!!document.querySelector('{}')", SEARCH_FIELD_SELECTOR)
}

fn result_state_js() -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector('{name}');
            if (el && el.innerText.trim()) {{
                return {{ state: 'found', name: el.innerText.trim() }};
            }}
            if (document.querySelector('{empty}')) {{
                return {{ state: 'empty' }};
            }}
            return {{ state: 'pending' }};
        }})()
        "#,
        name = RESULT_NAME_SELECTOR,
        empty = NO_RESULTS_SELECTOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserSession;
    use crate::services::normalizer::normalize_text;
    use serde_json::json;

    #[test]
    fn test_page_state_from_js_value() {
        let found: PageState =
            serde_json::from_value(json!({ "state": "found", "name": "ACME TRADING LIMITED" })).unwrap();
        assert_eq!(
            found,
            PageState::Found {
                name: "ACME TRADING LIMITED".to_string()
            }
        );
        let pending: PageState = serde_json::from_value(json!({ "state": "pending" })).unwrap();
        assert_eq!(pending, PageState::Pending);
    }

    fn id(raw: &str) -> Identifier {
        normalize_text(raw).unwrap().remove(0)
    }

    /// 得到一个真实的 `Elapsed`
    async fn elapsed() -> Elapsed {
        timeout(Duration::ZERO, std::future::pending::<()>())
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_call_timeout_is_not_found() {
        let outcome = outcome_from_attempt(&id("691054"), Err(elapsed().await));
        assert_eq!(outcome, RawOutcome::Empty);
    }

    #[test]
    fn test_automation_failure_is_exception() {
        let outcome = outcome_from_attempt(
            &id("691054"),
            Ok(Err(anyhow::anyhow!("找不到元素 #search-field"))),
        );
        assert_eq!(
            outcome,
            RawOutcome::Exception("Browser automation failed: 找不到元素 #search-field".to_string())
        );
        assert!(outcome.is_retryable());
    }

    #[test]
    fn test_completed_attempt_passes_through() {
        let outcome = outcome_from_attempt(&id("691054"), Ok(Ok(RawOutcome::Empty)));
        assert_eq!(outcome, RawOutcome::Empty);
    }

    #[test]
    fn test_wait_timeout_or_pending_is_not_found() {
        assert_eq!(outcome_from_state(&id("691054"), None), RawOutcome::Empty);
        assert_eq!(
            outcome_from_state(&id("691054"), Some(PageState::Pending)),
            RawOutcome::Empty
        );
        assert_eq!(
            outcome_from_state(&id("691054"), Some(PageState::Empty)),
            RawOutcome::Empty
        );
    }

    #[test]
    fn test_found_state_is_name_only_record() {
        let outcome = outcome_from_state(
            &id(" 691054 "),
            Some(PageState::Found {
                name: "ACME TRADING LIMITED".to_string(),
            }),
        );
        assert_eq!(
            outcome,
            RawOutcome::Records(vec![RegistryRecord::name_only("691054", "ACME TRADING LIMITED")])
        );
        if let RawOutcome::Records(records) = outcome {
            assert_eq!(records[0].business_indicator, None);
        }
    }

    #[test]
    fn test_scripts_reference_selectors() {
        assert!(result_state_js().contains(RESULT_NAME_SELECTOR));
        assert!(result_state_js().contains(NO_RESULTS_SELECTOR));
        assert!(search_field_js().contains(SEARCH_FIELD_SELECTOR));
    }

    /// 需要本机安装 Chrome 并能访问 core.cro.ie
    #[tokio::test]
    #[ignore]
    async fn test_scrape_live_registry() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::default();
        let session = BrowserSession::acquire(&config).await.expect("启动浏览器失败");
        let client = CroScrapeClient::new(JsExecutor::new(session.page().clone()), &config);

        let id = normalize_text("691054").unwrap().remove(0);
        let outcome = client.query(&id, EntityTypeFilter::Either).await;
        println!("抓取结果: {}", outcome);
        session.close().await;

        assert!(!outcome.is_auth_error());
    }
}
