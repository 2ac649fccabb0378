//! 注册处客户端
//!
//! 每个客户端对每个 (编号, 过滤器) 只发一次请求，不做重试；
//! 重试和节奏控制由 [`crate::workflow::LookupFlow`] 负责。

pub mod cro_api_client;
pub mod cro_scrape_client;

use async_trait::async_trait;

use crate::models::{EntityTypeFilter, Identifier, RawOutcome};

pub use cro_api_client::CroApiClient;
pub use cro_scrape_client::CroScrapeClient;

/// 注册处查询能力
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// 客户端名称（日志用）
    fn name(&self) -> &'static str;

    /// 一个过滤器需要拆成哪些子查询，按顺序执行
    fn sub_queries(&self, filter: EntityTypeFilter) -> Vec<EntityTypeFilter>;

    /// 执行一次查询
    async fn query(&self, identifier: &Identifier, filter: EntityTypeFilter) -> RawOutcome;
}
