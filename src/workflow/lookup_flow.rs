//! 单个编号的查询流程 - 流程层
//!
//! 流程顺序：
//! 1. 按过滤器拆出子查询（Company 在 Business 之前）
//! 2. 每个子查询：节奏控制 → 查询 → 可重试失败时退避重试
//! 3. 分类并合并成该编号的结果行
//!
//! 遇到认证失败立即停止剩余子查询。

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::clients::RegistryClient;
use crate::config::Config;
use crate::models::{EntityTypeFilter, RawOutcome};
use crate::services::classifier::{self, Classification};
use crate::workflow::lookup_ctx::LookupCtx;

/// 重试与节奏策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// 额外重试次数
    pub max_retries: usize,
    /// 第 n 次重试前等待 `retry_delay * n`
    pub retry_delay: Duration,
    /// 相邻两次请求的最小间隔
    pub request_delay: Duration,
}

impl QueryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// 不重试、不等待
    pub fn immediate() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
            request_delay: Duration::ZERO,
        }
    }
}

/// 单个编号的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutput {
    pub classification: Classification,
    /// 实际发出的请求数（含重试）
    pub queries_issued: usize,
}

/// 单个编号的查询流程
///
/// - 不持有浏览器或 HTTP 资源，只依赖 [`RegistryClient`]
/// - 客户端本身不重试，重试在这里完成
pub struct LookupFlow<'a> {
    client: &'a dyn RegistryClient,
    policy: QueryPolicy,
    last_request: Mutex<Option<Instant>>,
}

impl<'a> LookupFlow<'a> {
    pub fn new(client: &'a dyn RegistryClient, policy: QueryPolicy) -> Self {
        Self {
            client,
            policy,
            last_request: Mutex::new(None),
        }
    }

    pub async fn run(&self, ctx: &LookupCtx, filter: EntityTypeFilter) -> FlowOutput {
        let sub_queries = self.client.sub_queries(filter);
        let mut parts = Vec::with_capacity(sub_queries.len());
        let mut queries_issued = 0;

        for sub_filter in sub_queries {
            let (outcome, attempts) = self.query_with_retry(ctx, sub_filter).await;
            queries_issued += attempts;

            let classification = classifier::classify(&ctx.identifier, sub_filter, outcome);
            let fatal = classification.fatal;
            parts.push(classification);
            if fatal {
                break;
            }
        }

        FlowOutput {
            classification: classifier::merge(&ctx.identifier, parts),
            queries_issued,
        }
    }

    async fn query_with_retry(&self, ctx: &LookupCtx, filter: EntityTypeFilter) -> (RawOutcome, usize) {
        let mut attempt = 0;
        loop {
            self.pace().await;
            let outcome = self.client.query(&ctx.identifier, filter).await;
            attempt += 1;

            if !outcome.is_retryable() || attempt > self.policy.max_retries {
                if outcome.is_retryable() {
                    warn!("{} ⚠️ {} 查询失败，已重试 {} 次: {}", ctx, filter, attempt - 1, outcome);
                }
                return (outcome, attempt);
            }

            let delay = self.policy.retry_delay * attempt as u32;
            info!(
                "{} {} 查询失败 ({}), {:?} 后重试 ({}/{})",
                ctx, filter, outcome, delay, attempt, self.policy.max_retries
            );
            sleep(delay).await;
        }
    }

    /// 保证相邻两次请求之间至少间隔 `request_delay`
    async fn pace(&self) {
        let wait = {
            let last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            last.map(|t| self.policy.request_delay.saturating_sub(t.elapsed()))
        };
        if let Some(wait) = wait.filter(|w| !w.is_zero()) {
            sleep(wait).await;
        }

        let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessIndicator, Identifier, RegistryRecord, RowStatus};
    use crate::services::normalizer::normalize_text;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// 按顺序返回预设结果
    struct Scripted {
        outcomes: Mutex<VecDeque<RawOutcome>>,
        calls: Mutex<Vec<EntityTypeFilter>>,
        split: bool,
    }

    impl Scripted {
        fn new(outcomes: Vec<RawOutcome>, split: bool) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
                split,
            }
        }
    }

    #[async_trait]
    impl RegistryClient for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn sub_queries(&self, filter: EntityTypeFilter) -> Vec<EntityTypeFilter> {
            match filter {
                EntityTypeFilter::Either if self.split => {
                    vec![EntityTypeFilter::Company, EntityTypeFilter::Business]
                }
                other => vec![other],
            }
        }

        async fn query(&self, _identifier: &Identifier, filter: EntityTypeFilter) -> RawOutcome {
            self.calls.lock().unwrap().push(filter);
            self.outcomes.lock().unwrap().pop_front().unwrap_or(RawOutcome::Empty)
        }
    }

    fn ctx(raw: &str) -> LookupCtx {
        LookupCtx::new(normalize_text(raw).unwrap().remove(0), 1, 1)
    }

    fn company(number: &str) -> RawOutcome {
        RawOutcome::Records(vec![RegistryRecord {
            business_indicator: Some(BusinessIndicator::Company),
            ..RegistryRecord::name_only(number, "ACME")
        }])
    }

    #[tokio::test]
    async fn test_either_issues_company_then_business() {
        let client = Scripted::new(vec![company("1"), RawOutcome::Empty], true);
        let flow = LookupFlow::new(&client, QueryPolicy::immediate());

        let out = flow.run(&ctx("1"), EntityTypeFilter::Either).await;
        assert_eq!(
            *client.calls.lock().unwrap(),
            vec![EntityTypeFilter::Company, EntityTypeFilter::Business]
        );
        assert_eq!(out.queries_issued, 2);
        assert_eq!(out.classification.rows.len(), 1);
        assert_eq!(out.classification.rows[0].status, RowStatus::Found);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let client = Scripted::new(
            vec![RawOutcome::http(503, "Service Unavailable"), RawOutcome::Exception("reset".into()), company("1")],
            false,
        );
        let policy = QueryPolicy {
            max_retries: 2,
            ..QueryPolicy::immediate()
        };
        let flow = LookupFlow::new(&client, policy);

        let out = flow.run(&ctx("1"), EntityTypeFilter::Company).await;
        assert_eq!(out.queries_issued, 3);
        assert_eq!(out.classification.rows[0].status, RowStatus::Found);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let client = Scripted::new(vec![RawOutcome::http(500, "Internal Server Error"); 5], false);
        let policy = QueryPolicy {
            max_retries: 1,
            ..QueryPolicy::immediate()
        };
        let flow = LookupFlow::new(&client, policy);

        let out = flow.run(&ctx("1"), EntityTypeFilter::Company).await;
        assert_eq!(out.queries_issued, 2);
        assert_eq!(out.classification.rows[0].error.as_deref(), Some("HTTP 500"));
    }

    #[tokio::test]
    async fn test_auth_error_not_retried_and_stops_sub_queries() {
        let client = Scripted::new(vec![RawOutcome::AuthError("HTTP 401".into())], true);
        let flow = LookupFlow::new(&client, QueryPolicy { max_retries: 3, ..QueryPolicy::immediate() });

        let out = flow.run(&ctx("1"), EntityTypeFilter::Either).await;
        assert_eq!(out.queries_issued, 1);
        assert!(out.classification.fatal);
        assert_eq!(out.classification.rows.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_requests() {
        let client = Scripted::new(vec![RawOutcome::Empty, RawOutcome::Empty], false);
        let policy = QueryPolicy {
            request_delay: Duration::from_millis(500),
            ..QueryPolicy::immediate()
        };
        let flow = LookupFlow::new(&client, policy);

        let start = Instant::now();
        flow.run(&ctx("1"), EntityTypeFilter::Company).await;
        flow.run(&ctx("2"), EntityTypeFilter::Company).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
