//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **输入整理**：从文本或上传的 CSV 读取编号并规范化
//! 2. **资源管理**：按传输策略创建客户端；抓取策略下持有唯一的浏览器会话，
//!    在所有退出路径上释放
//! 3. **向下委托**：委托 `lookup_runner` 逐个查询
//! 4. **导出与统计**：写出 CSV，输出统计信息

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::info;

use crate::browser::BrowserSession;
use crate::clients::{CroApiClient, CroScrapeClient};
use crate::config::{Config, TransportStrategy};
use crate::error::{AppResult, InputError};
use crate::infrastructure::JsExecutor;
use crate::models::{load_identifier_column, Identifier, LookupTable};
use crate::orchestrator::lookup_runner::run_lookup;
use crate::services::{csv_exporter, normalizer};
use crate::utils::logging;
use crate::workflow::QueryPolicy;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行完整任务：读取输入 → 查询 → 导出 CSV → 统计
    pub async fn run(&self) -> AppResult<LookupTable> {
        logging::log_startup(&self.config);

        let identifiers = self.load_identifiers().await?;
        logging::log_identifiers_loaded(identifiers.len());

        let table = self.lookup(&identifiers, |_, _| {}).await?;

        csv_exporter::write_csv(&table, Path::new(&self.config.output_csv)).await?;
        logging::print_final_stats(&table, &self.config.output_csv);

        Ok(table)
    }

    /// 读取编号：优先使用上传的 CSV，其次是直接输入的文本
    pub async fn load_identifiers(&self) -> AppResult<Vec<Identifier>> {
        if let Some(file) = &self.config.input_file {
            info!("\n📁 正在读取编号文件: {}", file);
            let cells =
                load_identifier_column(Path::new(file), self.config.input_column.as_deref()).await?;
            return normalizer::normalize_cells(cells);
        }

        match &self.config.input_text {
            Some(text) => normalizer::normalize_text(text),
            None => Err(InputError::NoIdentifiers.into()),
        }
    }

    /// 对自由文本输入执行查询
    pub async fn lookup_text<P>(&self, raw: &str, progress: P) -> AppResult<LookupTable>
    where
        P: FnMut(usize, usize) + Send,
    {
        let identifiers = normalizer::normalize_text(raw)?;
        self.lookup(&identifiers, progress).await
    }

    /// 对规范化后的编号执行查询
    ///
    /// 空列表和缺少凭据在发出任何请求之前报错；
    /// 之后的单个编号失败都只体现在结果行中。
    pub async fn lookup<P>(&self, identifiers: &[Identifier], progress: P) -> AppResult<LookupTable>
    where
        P: FnMut(usize, usize) + Send,
    {
        if identifiers.is_empty() {
            return Err(InputError::NoIdentifiers.into());
        }

        let policy = QueryPolicy::from_config(&self.config);
        let filter = self.config.entity_type_filter;

        match self.config.transport_strategy {
            TransportStrategy::StructuredQuery => {
                let client = CroApiClient::from_config(&self.config)?;
                Ok(run_lookup(&client, identifiers, filter, policy, progress).await)
            }
            TransportStrategy::Scrape => {
                let session = BrowserSession::acquire(&self.config).await?;
                let client =
                    CroScrapeClient::new(JsExecutor::new(session.page().clone()), &self.config);

                let result = AssertUnwindSafe(run_lookup(&client, identifiers, filter, policy, progress))
                    .catch_unwind()
                    .await;

                // 无论是否 panic 都先释放会话
                session.close().await;

                match result {
                    Ok(table) => Ok(table),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        }
    }
}
